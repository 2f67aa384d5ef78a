//! Template leaves
//!
//! A template leaf is one of three kinds, fixed when it is added:
//!
//!     Primitive   literal data, copied into every snapshot
//!     Thunk       a zero-argument function, called afresh for every snapshot
//!     Generator   a factory for a stateful stepper, started once per sequence and
//!                 advanced once per snapshot
//!
//! Steppers implement [`Resumable`] and report each advance as a [`Step`]. A completed step
//! is an explicit variant, so returned data is never inspected to guess whether a generator
//! finished.

use super::tree::Tree;
use super::value::{Primitive, Value};
use std::fmt;
use std::rc::Rc;

/// A template as composed by a builder
pub type Template = Tree<Leaf>;

/// One advance of a resumable leaf
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The stepper produced a value and can be resumed again
    Yielded(Value),
    /// The stepper finished; the carried value is used for the current snapshot only
    Complete(Value),
}

impl Step {
    pub fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            Step::Yielded(value) | Step::Complete(value) => value,
        }
    }
}

/// A stateful stepper driven once per snapshot
pub trait Resumable {
    fn resume(&mut self) -> Step;
}

impl<F> Resumable for F
where
    F: FnMut() -> Step,
{
    fn resume(&mut self) -> Step {
        self()
    }
}

/// Adapts an iterator: each item is a [`Step::Yielded`], the end is a
/// `Step::Complete(undefined)`.
pub struct IterStepper<I> {
    iter: I,
    finished: bool,
}

impl<I> IterStepper<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            finished: false,
        }
    }
}

impl<I> Resumable for IterStepper<I>
where
    I: Iterator<Item = Value>,
{
    fn resume(&mut self) -> Step {
        if self.finished {
            return Step::Complete(Value::undefined());
        }
        match self.iter.next() {
            Some(value) => Step::Yielded(value),
            None => {
                self.finished = true;
                Step::Complete(Value::undefined())
            }
        }
    }
}

/// A static function leaf
#[derive(Clone)]
pub struct Thunk(Rc<dyn Fn() -> Value>);

impl Thunk {
    pub fn new<F, V>(f: F) -> Self
    where
        F: Fn() -> V + 'static,
        V: Into<Value>,
    {
        Thunk(Rc::new(move || f().into()))
    }

    pub fn call(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thunk(..)")
    }
}

/// A generator leaf: a factory producing a fresh stepper for every sequence
#[derive(Clone)]
pub struct Generator(Rc<dyn Fn() -> Box<dyn Resumable>>);

impl Generator {
    pub fn new<F, R>(factory: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: Resumable + 'static,
    {
        Generator(Rc::new(move || Box::new(factory()) as Box<dyn Resumable>))
    }

    /// A generator yielding the items of a freshly created iterable, then completing
    pub fn from_iter<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator,
        I::Item: Into<Value>,
        I::IntoIter: 'static,
    {
        Generator::new(move || IterStepper::new(factory().into_iter().map(|item| -> Value { item.into() })))
    }

    /// Start a new stepper with its own state
    pub fn start(&self) -> Box<dyn Resumable> {
        (self.0)()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generator(..)")
    }
}

/// A template leaf
#[derive(Debug, Clone)]
pub enum Leaf {
    Primitive(Primitive),
    Thunk(Thunk),
    Generator(Generator),
}

impl From<Primitive> for Leaf {
    fn from(primitive: Primitive) -> Self {
        Leaf::Primitive(primitive)
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Primitive(primitive) => write!(f, "{}", primitive),
            Leaf::Thunk(_) => write!(f, "<thunk>"),
            Leaf::Generator(_) => write!(f, "<generator>"),
        }
    }
}

impl Tree<Leaf> {
    /// A static function leaf
    pub fn thunk<F, V>(f: F) -> Self
    where
        F: Fn() -> V + 'static,
        V: Into<Value>,
    {
        Tree::Leaf(Leaf::Thunk(Thunk::new(f)))
    }

    /// A generator leaf built from a stepper factory
    pub fn generator<F, R>(factory: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: Resumable + 'static,
    {
        Tree::Leaf(Leaf::Generator(Generator::new(factory)))
    }

    /// A generator leaf built from an iterable factory
    pub fn iter<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator,
        I::Item: Into<Value>,
        I::IntoIter: 'static,
    {
        Tree::Leaf(Leaf::Generator(Generator::from_iter(factory)))
    }

    /// Whether any leaf is a generator
    pub fn has_generators(&self) -> bool {
        match self {
            Tree::Array(items) => items.iter().any(Template::has_generators),
            Tree::Object(entries) => entries.values().any(Template::has_generators),
            Tree::Leaf(leaf) => matches!(leaf, Leaf::Generator(_)),
        }
    }
}

impl From<Thunk> for Template {
    fn from(thunk: Thunk) -> Self {
        Tree::Leaf(Leaf::Thunk(thunk))
    }
}

impl From<Generator> for Template {
    fn from(generator: Generator) -> Self {
        Tree::Leaf(Leaf::Generator(generator))
    }
}

impl From<Value> for Template {
    fn from(value: Value) -> Self {
        super::tree::walk(&value, |primitive| Tree::Leaf(Leaf::Primitive(primitive.clone())))
    }
}
