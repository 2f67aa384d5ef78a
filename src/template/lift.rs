//! Generator lifting
//!
//! Before the first snapshot of a sequence, every generator leaf of the captured template is
//! started, yielding a stepper that belongs to that sequence alone. Thunks stay thunks so they
//! are called afresh on every snapshot; primitives are copied.
//!
//! The [`Registry`] counts the steppers started by lifting and still running. It is owned by
//! the sequence and threaded through lifting and compiling by `&mut`.

use super::leaf::{Leaf, Resumable, Template, Thunk};
use super::tree::{walk, Tree};
use super::value::Primitive;
use std::fmt;

/// A leaf of a lifted template
pub enum Live {
    Primitive(Primitive),
    Thunk(Thunk),
    Stepper(Box<dyn Resumable>),
}

impl fmt::Debug for Live {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Live::Primitive(primitive) => f.debug_tuple("Primitive").field(primitive).finish(),
            Live::Thunk(thunk) => f.debug_tuple("Thunk").field(thunk).finish(),
            Live::Stepper(_) => write!(f, "Stepper(..)"),
        }
    }
}

impl fmt::Display for Live {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Live::Primitive(primitive) => write!(f, "{}", primitive),
            Live::Thunk(_) => write!(f, "<thunk>"),
            Live::Stepper(_) => write!(f, "<stepper>"),
        }
    }
}

/// Count of resumable leaves for one sequence
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registry {
    started: usize,
    active: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stepper was started
    pub fn register(&mut self) {
        self.started += 1;
        self.active += 1;
    }

    /// A stepper reported completion
    pub fn complete(&mut self) {
        self.active = self.active.saturating_sub(1);
    }

    /// Steppers started by lifting
    pub fn started(&self) -> usize {
        self.started
    }

    /// Steppers that have not completed yet
    pub fn active(&self) -> usize {
        self.active
    }

    /// True once at least one stepper existed and all of them have completed
    pub fn is_drained(&self) -> bool {
        self.started > 0 && self.active == 0
    }
}

/// Start every generator in `template`, registering each stepper
pub fn lift(template: &Template, registry: &mut Registry) -> Tree<Live> {
    let lifted = walk(template, |leaf| {
        Tree::Leaf(match leaf {
            Leaf::Primitive(primitive) => Live::Primitive(primitive.clone()),
            Leaf::Thunk(thunk) => Live::Thunk(thunk.clone()),
            Leaf::Generator(generator) => {
                registry.register();
                Live::Stepper(generator.start())
            }
        })
    });
    tracing::trace!(steppers = registry.started(), "lifted template");
    lifted
}
