//! Generic tree shape shared by templates, lifted templates and snapshots
//!
//! Every stage of the engine works on the same container shape and only swaps the leaf type:
//!
//!     Tree<Leaf>       a template as composed by a builder
//!     Tree<Live>       a template lifted for one sequence (generators started)
//!     Tree<Primitive>  a resolved snapshot
//!
//! Callables only ever live in leaves, so a thunk or a generator can never be mistaken for a
//! container while walking.
//!
//! The walkers below are the single traversal used by lifting and compiling. They always
//! produce fresh containers; whether leaves are shared is up to the leaf function.

use indexmap::IndexMap;
use std::fmt;

/// Ordered mapping used for every object node. Iteration follows insertion order.
pub type Map<T> = IndexMap<String, T>;

/// A nested structure of arrays, objects and leaves
#[derive(Debug, Clone, PartialEq)]
pub enum Tree<L> {
    Array(Vec<Tree<L>>),
    Object(Map<Tree<L>>),
    Leaf(L),
}

impl<L> Tree<L> {
    /// An empty object node
    pub fn object() -> Self {
        Tree::Object(Map::new())
    }

    /// Build an object node from key/value pairs, keeping their order
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Tree<L>>,
    {
        Tree::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Tree::Object(_))
    }

    pub fn as_object(&self) -> Option<&Map<Tree<L>>> {
        match self {
            Tree::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Map<Tree<L>>> {
        match self {
            Tree::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Tree<L>]> {
        match self {
            Tree::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&L> {
        match self {
            Tree::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Child of an object node
    pub fn get(&self, key: &str) -> Option<&Tree<L>> {
        self.as_object().and_then(|entries| entries.get(key))
    }

    /// Follow a dot path through nested objects (`"a.b.c"`). Numeric steps index arrays.
    pub fn lookup(&self, path: &str) -> Option<&Tree<L>> {
        path.split('.').try_fold(self, |node, step| match node {
            Tree::Object(entries) => entries.get(step),
            Tree::Array(items) => step.parse::<usize>().ok().and_then(|i| items.get(i)),
            Tree::Leaf(_) => None,
        })
    }

    /// Top-level keys of an object node, in order. Empty for anything else.
    pub fn keys(&self) -> Vec<String> {
        self.as_object()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Rebuild `tree` with every leaf replaced by `leaf_fn(leaf)`.
///
/// The leaf function may return a whole subtree, which is spliced in place of the leaf.
pub fn walk<A, B>(tree: &Tree<A>, mut leaf_fn: impl FnMut(&A) -> Tree<B>) -> Tree<B> {
    walk_ref(tree, &mut leaf_fn)
}

fn walk_ref<A, B, F>(tree: &Tree<A>, leaf_fn: &mut F) -> Tree<B>
where
    F: FnMut(&A) -> Tree<B>,
{
    match tree {
        Tree::Array(items) => Tree::Array(items.iter().map(|item| walk_ref(item, leaf_fn)).collect()),
        Tree::Object(entries) => Tree::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), walk_ref(value, leaf_fn)))
                .collect(),
        ),
        Tree::Leaf(leaf) => leaf_fn(leaf),
    }
}

/// Like [`walk`], but the leaf function may rewrite the leaf in its parent container.
pub fn walk_mut<A, B>(tree: &mut Tree<A>, mut leaf_fn: impl FnMut(&mut A) -> Tree<B>) -> Tree<B> {
    walk_mut_ref(tree, &mut leaf_fn)
}

fn walk_mut_ref<A, B, F>(tree: &mut Tree<A>, leaf_fn: &mut F) -> Tree<B>
where
    F: FnMut(&mut A) -> Tree<B>,
{
    match tree {
        Tree::Array(items) => Tree::Array(
            items
                .iter_mut()
                .map(|item| walk_mut_ref(item, leaf_fn))
                .collect(),
        ),
        Tree::Object(entries) => Tree::Object(
            entries
                .iter_mut()
                .map(|(key, value)| (key.clone(), walk_mut_ref(value, leaf_fn)))
                .collect(),
        ),
        Tree::Leaf(leaf) => leaf_fn(leaf),
    }
}

impl<L: fmt::Display> fmt::Display for Tree<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Tree::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Tree::Leaf(leaf) => write!(f, "{}", leaf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree<i32> {
        Tree::from_entries([
            ("a", Tree::Leaf(1)),
            (
                "b",
                Tree::Array(vec![Tree::Leaf(2), Tree::from_entries([("c", Tree::Leaf(3))])]),
            ),
        ])
    }

    #[test]
    fn test_walk_keeps_shape_and_order() {
        let doubled = walk(&sample(), |n| Tree::Leaf(n * 2));
        assert_eq!(doubled.keys(), vec!["a", "b"]);
        assert_eq!(doubled.lookup("a"), Some(&Tree::Leaf(2)));
        assert_eq!(doubled.lookup("b.0"), Some(&Tree::Leaf(4)));
        assert_eq!(doubled.lookup("b.1.c"), Some(&Tree::Leaf(6)));
    }

    #[test]
    fn test_walk_can_splice_subtrees() {
        let tree = Tree::Array(vec![Tree::Leaf(2)]);
        let expanded: Tree<i32> = walk(&tree, |n| Tree::Array(vec![Tree::Leaf(*n); *n as usize]));
        assert_eq!(
            expanded,
            Tree::Array(vec![Tree::Array(vec![Tree::Leaf(2), Tree::Leaf(2)])])
        );
    }

    #[test]
    fn test_walk_mut_rewrites_slots() {
        let mut tree = sample();
        let seen = walk_mut(&mut tree, |n| {
            let before = *n;
            *n = 0;
            Tree::Leaf(before)
        });
        assert_eq!(seen, sample());
        assert_eq!(tree.lookup("b.1.c"), Some(&Tree::Leaf(0)));
    }

    #[test]
    fn test_walk_visits_leaves_in_insertion_order() {
        let mut order = Vec::new();
        walk(&sample(), |n: &i32| {
            order.push(*n);
            Tree::<()>::Leaf(())
        });
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_lookup_misses() {
        let tree = sample();
        assert!(tree.lookup("missing").is_none());
        assert!(tree.lookup("a.deeper").is_none());
        assert!(tree.lookup("b.7").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(sample().to_string(), r#"{"a": 1, "b": [2, {"c": 3}]}"#);
    }
}
