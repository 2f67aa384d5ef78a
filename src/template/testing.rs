//! Fluent assertions for snapshot sequences
//!
//!     Tests about sequences tend to collect snapshots into a vector and index into nested
//!     JSON by hand, which buries the intent (how many snapshots, which value at which path)
//!     under plumbing. These helpers pull a bounded number of snapshots once and let the test
//!     state what it expects about them.
//!
//! Usage Example
//!
//!     ```rust,ignore
//!     use tidal::template::testing::assert_snapshots;
//!
//!     assert_snapshots(builder.build(), 10)
//!         .count(3)
//!         .exhausted()
//!         .snapshot(0, |s| s.at("price", json!(1)).undefined_at("missing"))
//!         .snapshot(2, |s| s.equals(json!({"price": 3})));
//!     ```
//!
//!     Paths use the same dot syntax as `Builder::add_at`, with numeric steps indexing
//!     arrays (`"items.0.name"`).

use super::sequence::Snapshots;
use super::value::Value;
use serde_json::Value as Json;

/// Pull at most `take` snapshots from `snapshots` and start asserting on them
pub fn assert_snapshots(mut snapshots: Snapshots, take: usize) -> SequenceAssertion {
    let collected: Vec<Value> = snapshots.by_ref().take(take).collect();
    let ended = collected.len() < take || snapshots.next().is_none();
    SequenceAssertion {
        snapshots: collected,
        ended,
        take,
    }
}

pub struct SequenceAssertion {
    snapshots: Vec<Value>,
    ended: bool,
    take: usize,
}

impl SequenceAssertion {
    pub fn count(self, expected: usize) -> Self {
        assert_eq!(
            self.snapshots.len(),
            expected,
            "Expected {} snapshots, got {}: {}",
            expected,
            self.snapshots.len(),
            self.summary()
        );
        self
    }

    /// The sequence ended within the pulled window
    pub fn exhausted(self) -> Self {
        assert!(
            self.ended,
            "Expected the sequence to end within {} snapshots, but it kept going",
            self.take
        );
        self
    }

    /// The sequence was still producing after the pulled window
    pub fn unending(self) -> Self {
        assert!(
            !self.ended,
            "Expected the sequence to outlast {} snapshots, but it ended after {}",
            self.take,
            self.snapshots.len()
        );
        self
    }

    pub fn snapshot<F>(self, index: usize, check: F) -> Self
    where
        F: FnOnce(SnapshotAssertion<'_>) -> SnapshotAssertion<'_>,
    {
        let value = self.snapshots.get(index).unwrap_or_else(|| {
            panic!(
                "Snapshot index {} out of bounds ({} snapshots)",
                index,
                self.snapshots.len()
            )
        });
        check(SnapshotAssertion {
            value,
            context: format!("snapshot[{}]", index),
        });
        self
    }

    /// The values at `path` across all pulled snapshots, in order
    pub fn values_at(self, path: &str, expected: &[Json]) -> Self {
        let actual: Vec<Json> = self
            .snapshots
            .iter()
            .map(|snapshot| json_at(snapshot, path))
            .collect();
        assert_eq!(
            actual, expected,
            "Values at '{}' differ across snapshots",
            path
        );
        self
    }

    pub fn into_snapshots(self) -> Vec<Value> {
        self.snapshots
    }

    fn summary(&self) -> String {
        self.snapshots
            .iter()
            .map(|snapshot| snapshot.to_json().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub struct SnapshotAssertion<'a> {
    value: &'a Value,
    context: String,
}

impl<'a> SnapshotAssertion<'a> {
    pub fn equals(self, expected: Json) -> Self {
        let actual = self.value.to_json();
        assert_eq!(actual, expected, "{}: unexpected snapshot", self.context);
        self
    }

    pub fn at(self, path: &str, expected: Json) -> Self {
        assert!(
            self.value.lookup(path).is_some(),
            "{}: Expected a value at '{}' in {}",
            self.context,
            path,
            self.value
        );
        let actual = json_at(self.value, path);
        assert_eq!(
            actual, expected,
            "{}: Expected '{}' to be {}, got {}",
            self.context, path, expected, actual
        );
        self
    }

    /// Nothing resolved at `path`: the path is missing or holds `undefined`
    pub fn undefined_at(self, path: &str) -> Self {
        let found = self.value.lookup(path).filter(|node| !node.is_undefined());
        assert!(
            found.is_none(),
            "{}: Expected '{}' to be undefined, got {}",
            self.context,
            path,
            json_at(self.value, path)
        );
        self
    }

    /// Top-level keys, in order
    pub fn keys(self, expected: &[&str]) -> Self {
        let actual = self.value.keys();
        assert_eq!(actual, expected, "{}: unexpected keys", self.context);
        self
    }
}

fn json_at(value: &Value, path: &str) -> Json {
    value
        .lookup(path)
        .map(Value::to_json)
        .unwrap_or(Json::Null)
}
