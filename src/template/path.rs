//! Dot-path expansion
//!
//! `expand(root, "a.b.c", value)` makes sure `root.a` and `root.a.b` are objects (creating
//! them, or replacing whatever non-object sits there) and then places `value` at `c`.
//!
//! Placement follows one rule, shared with [`place`]:
//!
//!     object value     shallow merge into an existing object; incoming keys win,
//!                      other keys stay
//!     anything else    replaces the slot
//!
//! Merging is one level deep. Nested objects inside the incoming value replace their
//! counterparts.

use super::tree::{Map, Tree};
use indexmap::map::Entry;

/// Split a dot path into its steps
pub fn steps(path: &str) -> impl Iterator<Item = &str> {
    path.split('.')
}

/// Whether `path` has at least one step and no empty steps
pub fn is_valid(path: &str) -> bool {
    !path.is_empty() && steps(path).all(|step| !step.is_empty())
}

/// Place `value` at `path` below `root` and return the node now at that location
pub fn expand<'a, L>(root: &'a mut Tree<L>, path: &str, value: Tree<L>) -> &'a mut Tree<L> {
    let mut parts: Vec<&str> = steps(path).collect();
    let last = parts.pop().unwrap_or_default();
    let mut node = root;
    for step in parts {
        node = ensure_object(node)
            .entry(step.to_string())
            .or_insert_with(Tree::object);
    }
    place(ensure_object(node), last, value)
}

/// Place `value` under `key` using the merge rule
pub fn place<'a, L>(entries: &'a mut Map<Tree<L>>, key: &str, value: Tree<L>) -> &'a mut Tree<L> {
    match value {
        Tree::Object(incoming) => {
            let slot = entries.entry(key.to_string()).or_insert_with(Tree::object);
            let target = ensure_object(slot);
            for (k, v) in incoming {
                target.insert(k, v);
            }
            slot
        }
        other => match entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(other);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(other),
        },
    }
}

/// Turn `node` into an object if it is not one already
pub fn ensure_object<L>(node: &mut Tree<L>) -> &mut Map<Tree<L>> {
    if !node.is_object() {
        *node = Tree::object();
    }
    match node {
        Tree::Object(entries) => entries,
        _ => unreachable!("node was just replaced with an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: i32) -> Tree<i32> {
        Tree::Leaf(n)
    }

    #[test]
    fn test_expand_creates_intermediate_objects() {
        let mut root = Tree::object();
        let placed = expand(&mut root, "a.b.c", leaf(1));
        assert_eq!(*placed, leaf(1));
        assert_eq!(root.lookup("a.b.c"), Some(&leaf(1)));
    }

    #[test]
    fn test_expand_replaces_non_object_intermediates() {
        let mut root = Tree::from_entries([("a", leaf(1))]);
        expand(&mut root, "a.b", leaf(2));
        assert_eq!(root, Tree::from_entries([("a", Tree::from_entries([("b", leaf(2))]))]));
    }

    #[test]
    fn test_expand_merges_objects_shallowly() {
        let mut root = Tree::object();
        expand(
            &mut root,
            "a",
            Tree::from_entries([("keep", leaf(1)), ("nested", Tree::from_entries([("x", leaf(1))]))]),
        );
        expand(
            &mut root,
            "a",
            Tree::from_entries([("nested", Tree::from_entries([("y", leaf(2))])), ("new", leaf(3))]),
        );
        let a = root.get("a").unwrap();
        assert_eq!(a.keys(), vec!["keep", "nested", "new"]);
        assert_eq!(a.lookup("nested.y"), Some(&leaf(2)));
        assert!(a.lookup("nested.x").is_none());
    }

    #[test]
    fn test_expand_replaces_objects_with_other_kinds() {
        let mut root = Tree::object();
        expand(&mut root, "a", Tree::from_entries([("x", leaf(1))]));
        expand(&mut root, "a", Tree::Array(vec![leaf(2)]));
        assert_eq!(root.get("a"), Some(&Tree::Array(vec![leaf(2)])));
    }

    #[test]
    fn test_expand_over_non_object_root() {
        let mut root = leaf(9);
        expand(&mut root, "a", leaf(1));
        assert_eq!(root, Tree::from_entries([("a", leaf(1))]));
    }

    #[test]
    fn test_expand_keeps_key_position_on_replace() {
        let mut root = Tree::from_entries([("a", leaf(1)), ("b", leaf(2))]);
        expand(&mut root, "a", leaf(3));
        assert_eq!(root.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("a"));
        assert!(is_valid("a.b.c"));
        assert!(!is_valid(""));
        assert!(!is_valid("a..b"));
        assert!(!is_valid(".a"));
        assert!(!is_valid("a."));
    }
}
