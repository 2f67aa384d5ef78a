//! Snapshot compilation
//!
//! One compilation pass resolves every leaf of a lifted template exactly once:
//!
//!     Primitive   copied as-is
//!     Thunk       called, its value used as-is
//!     Stepper     resumed once; a yielded value is used as-is. A completed step also
//!                 decrements the registry and freezes the slot to `undefined`, so the
//!                 stepper is never resumed again within this sequence.
//!
//! Panics raised by user thunks or steppers are not caught; they surface from the pull that
//! triggered the pass.

use super::leaf::Step;
use super::lift::{Live, Registry};
use super::tree::{walk_mut, Tree};
use super::value::{Primitive, Value};

/// Leaf resolution strategy used by a sequence
pub trait Compiler {
    fn compile(&self, tree: &mut Tree<Live>, registry: &mut Registry) -> Value;
}

/// The default compiler
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotCompiler;

impl Compiler for SnapshotCompiler {
    fn compile(&self, tree: &mut Tree<Live>, registry: &mut Registry) -> Value {
        walk_mut(tree, |leaf| resolve(leaf, registry))
    }
}

/// Resolve a single live leaf for the current snapshot
pub fn resolve(leaf: &mut Live, registry: &mut Registry) -> Value {
    let step = match leaf {
        Live::Primitive(primitive) => return Tree::Leaf(primitive.clone()),
        Live::Thunk(thunk) => return thunk.call(),
        Live::Stepper(stepper) => stepper.resume(),
    };
    match step {
        Step::Yielded(value) => value,
        Step::Complete(value) => {
            registry.complete();
            *leaf = Live::Primitive(Primitive::Undefined);
            tracing::trace!(active = registry.active(), "stepper completed");
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::leaf::Template;
    use crate::template::lift::lift;
    use serde_json::json;

    #[test]
    fn test_compile_resolves_every_leaf_kind() {
        let template = Template::from_entries([
            ("plain", Template::from(json!({"x": [1, 2]}))),
            ("thunk", Template::thunk(|| Value::from(json!({"computed": true})))),
            ("gen", Template::iter(|| vec!["a", "b"])),
        ]);
        let mut registry = Registry::new();
        let mut lifted = lift(&template, &mut registry);
        let snapshot = SnapshotCompiler.compile(&mut lifted, &mut registry);
        assert_eq!(
            snapshot.to_json(),
            json!({"plain": {"x": [1, 2]}, "thunk": {"computed": true}, "gen": "a"})
        );
    }

    #[test]
    fn test_completion_freezes_slot() {
        let template = Template::from_entries([("gen", Template::iter(|| vec![1]))]);
        let mut registry = Registry::new();
        let mut lifted = lift(&template, &mut registry);

        let first = SnapshotCompiler.compile(&mut lifted, &mut registry);
        assert_eq!(first.get("gen"), Some(&Value::from(1)));
        assert_eq!(registry.active(), 1);

        let second = SnapshotCompiler.compile(&mut lifted, &mut registry);
        assert_eq!(second.get("gen"), Some(&Value::undefined()));
        assert_eq!(registry.active(), 0);
        assert!(matches!(
            lifted.get("gen"),
            Some(Tree::Leaf(Live::Primitive(Primitive::Undefined)))
        ));

        SnapshotCompiler.compile(&mut lifted, &mut registry);
        assert_eq!(registry.active(), 0);
    }

    #[test]
    fn test_final_value_of_completed_step_is_used_once() {
        let template = Template::from_entries([(
            "gen",
            Template::generator(|| {
                let mut done = false;
                move || {
                    if done {
                        Step::Yielded(Value::from("resumed after completion"))
                    } else {
                        done = true;
                        Step::Complete(Value::from("last"))
                    }
                }
            }),
        )]);
        let mut registry = Registry::new();
        let mut lifted = lift(&template, &mut registry);
        let first = SnapshotCompiler.compile(&mut lifted, &mut registry);
        let second = SnapshotCompiler.compile(&mut lifted, &mut registry);
        assert_eq!(first.get("gen"), Some(&Value::from("last")));
        assert_eq!(second.get("gen"), Some(&Value::undefined()));
    }

    #[test]
    fn test_data_shaped_like_a_step_record_is_plain_data() {
        let template = Template::from_entries([(
            "record",
            Template::thunk(|| Value::from(json!({"value": 1, "done": true}))),
        )]);
        let mut registry = Registry::new();
        let mut lifted = lift(&template, &mut registry);
        for _ in 0..2 {
            let snapshot = SnapshotCompiler.compile(&mut lifted, &mut registry);
            assert_eq!(snapshot.to_json(), json!({"record": {"value": 1, "done": true}}));
        }
        assert_eq!(registry.started(), 0);
    }
}
