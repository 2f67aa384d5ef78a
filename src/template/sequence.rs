//! Lazy snapshot sequences
//!
//! A [`Snapshots`] iterator owns a private copy of the (already shaped) template. Nothing
//! happens until the first pull: that pull lifts the template, starting its generators, and
//! every pull after it compiles exactly one snapshot. There is no buffering or prefetching;
//! dropping the iterator is the only cancellation.
//!
//! When the sequence ends depends on its [`Limit`]:
//!
//!     Count(n)     exactly n snapshots, whatever the generators do (0 is legal)
//!     Unbounded    never ends; completed generators keep resolving to `undefined`
//!     no limit     if the template has generators, ends once all of them have completed
//!                  (the pass in which the last one completes is not emitted); otherwise
//!                  never ends
//!
//! Generators that complete early stay frozen at `undefined` until the last one completes.

use super::compile::Compiler;
use super::leaf::Template;
use super::lift::{lift, Live, Registry};
use super::tree::Tree;
use super::value::Value;
use std::fmt;
use std::iter::FusedIterator;
use std::rc::Rc;

/// How many snapshots a sequence produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(usize),
    Unbounded,
}

impl Limit {
    /// Map a signed count: any negative value means unbounded (`-1` by convention)
    pub fn from_signed(count: i64) -> Self {
        usize::try_from(count)
            .map(Limit::Count)
            .unwrap_or(Limit::Unbounded)
    }
}

impl From<usize> for Limit {
    fn from(count: usize) -> Self {
        Limit::Count(count)
    }
}

enum State {
    Pending(Template),
    Running(Tree<Live>),
    Finished,
}

/// A lazy, pull-driven stream of resolved snapshots
pub struct Snapshots {
    state: State,
    registry: Registry,
    compiler: Rc<dyn Compiler>,
    limit: Option<Limit>,
    produced: usize,
}

impl Snapshots {
    pub fn new(template: Template, limit: Option<Limit>, compiler: Rc<dyn Compiler>) -> Self {
        Self {
            state: State::Pending(template),
            registry: Registry::new(),
            compiler,
            limit,
            produced: 0,
        }
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    /// Snapshots emitted so far
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Resumable leaves still running. Zero before the first pull.
    pub fn active(&self) -> usize {
        self.registry.active()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    fn finish(&mut self) -> Option<Value> {
        tracing::debug!(produced = self.produced, "sequence finished");
        self.state = State::Finished;
        None
    }
}

impl Iterator for Snapshots {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.is_finished() {
            return None;
        }
        if let Some(Limit::Count(count)) = self.limit {
            if self.produced >= count {
                return self.finish();
            }
        }

        if let State::Pending(template) = &self.state {
            let lifted = lift(template, &mut self.registry);
            self.state = State::Running(lifted);
        }
        let tree = match &mut self.state {
            State::Running(tree) => tree,
            _ => return None,
        };

        let snapshot = self.compiler.compile(tree, &mut self.registry);
        if self.limit.is_none() && self.registry.is_drained() {
            return self.finish();
        }
        self.produced += 1;
        Some(snapshot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (&self.state, self.limit) {
            (State::Finished, _) => (0, Some(0)),
            (_, Some(Limit::Count(count))) => {
                let remaining = count.saturating_sub(self.produced);
                (remaining, Some(remaining))
            }
            (_, Some(Limit::Unbounded)) => (usize::MAX, None),
            (_, None) => (0, None),
        }
    }
}

impl FusedIterator for Snapshots {}

impl fmt::Debug for Snapshots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Pending(_) => "pending",
            State::Running(_) => "running",
            State::Finished => "finished",
        };
        f.debug_struct("Snapshots")
            .field("state", &state)
            .field("limit", &self.limit)
            .field("produced", &self.produced)
            .field("registry", &self.registry)
            .finish()
    }
}
