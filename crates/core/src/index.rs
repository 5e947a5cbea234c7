//! Occurrence counters used to evaluate index qualifiers.
//!
//! The tracker keeps two families of keyed counters, relative and absolute,
//! for each [`CounterKind`], plus relative and absolute object ordinals.
//! Relative counters are scoped to one sibling scan and are cleared by
//! [`IndexTracker::reset_relative`]; absolute counters only ever grow during a
//! search attempt. Every increment advances both families in lockstep, so
//! `absolute >= relative` holds for every key.

use im::HashMap as ImHashMap;
use serde::Serialize;
use strum_macros::{Display, EnumIter};

/// The attribute a keyed counter is grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    Class,
    Subclass,
    Type,
    Id,
    Name,
}

/// Counter key for a resolved type; type comparison is case-insensitive.
pub fn type_key(resolved_type: &str) -> String {
    resolved_type.to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
struct KeyedCounts {
    class: ImHashMap<String, usize>,
    subclass: ImHashMap<String, usize>,
    #[serde(rename = "type")]
    type_: ImHashMap<String, usize>,
    id: ImHashMap<String, usize>,
    name: ImHashMap<String, usize>,
}

impl KeyedCounts {
    fn map(&self, kind: CounterKind) -> &ImHashMap<String, usize> {
        match kind {
            CounterKind::Class => &self.class,
            CounterKind::Subclass => &self.subclass,
            CounterKind::Type => &self.type_,
            CounterKind::Id => &self.id,
            CounterKind::Name => &self.name,
        }
    }

    fn map_mut(&mut self, kind: CounterKind) -> &mut ImHashMap<String, usize> {
        match kind {
            CounterKind::Class => &mut self.class,
            CounterKind::Subclass => &mut self.subclass,
            CounterKind::Type => &mut self.type_,
            CounterKind::Id => &mut self.id,
            CounterKind::Name => &mut self.name,
        }
    }

    fn get(&self, kind: CounterKind, key: &str) -> usize {
        self.map(kind).get(key).copied().unwrap_or(0)
    }

    fn bump(&mut self, kind: CounterKind, key: &str) -> usize {
        let entry = self.map_mut(kind).entry(key.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }
}

/// Live occurrence counters for one locate call.
///
/// Not shareable between concurrent searches; each locate call owns its own.
#[derive(Debug, Clone, Default)]
pub struct IndexTracker {
    relative: KeyedCounts,
    absolute: KeyedCounts,
    object: usize,
    absolute_object: usize,
}

impl IndexTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance both the relative and absolute counter for `key`.
    ///
    /// Returns the new relative count.
    pub fn increment(&mut self, kind: CounterKind, key: &str) -> usize {
        self.absolute.bump(kind, key);
        self.relative.bump(kind, key)
    }

    /// Advance both object ordinals. Returns the new relative ordinal.
    pub fn increment_object(&mut self) -> usize {
        self.absolute_object += 1;
        self.object += 1;
        self.object
    }

    /// Relative count for `key`, 0 if unseen
    pub fn get(&self, kind: CounterKind, key: &str) -> usize {
        self.relative.get(kind, key)
    }

    /// Absolute count for `key`, 0 if unseen
    pub fn get_absolute(&self, kind: CounterKind, key: &str) -> usize {
        self.absolute.get(kind, key)
    }

    pub fn object(&self) -> usize {
        self.object
    }

    pub fn absolute_object(&self) -> usize {
        self.absolute_object
    }

    /// Start a new sibling-scan scope: clear every relative counter and the
    /// relative object ordinal. Absolute counters are untouched.
    pub fn reset_relative(&mut self) {
        self.relative = KeyedCounts::default();
        self.object = 0;
    }

    /// Immutable copy of every counter
    pub fn snapshot(&self) -> MatchResult {
        MatchResult {
            relative: self.relative.clone(),
            absolute: self.absolute.clone(),
            object: self.object,
            absolute_object: self.absolute_object,
        }
    }

    /// Overwrite every counter from `snapshot`.
    pub fn restore_full(&mut self, snapshot: &MatchResult) {
        self.relative = snapshot.relative.clone();
        self.absolute = snapshot.absolute.clone();
        self.object = snapshot.object;
        self.absolute_object = snapshot.absolute_object;
    }

    /// Roll back only the relative class and subclass counters.
    ///
    /// Used when backing out of a failed descent below a non-matching sibling.
    /// Id, name, type, object and all absolute counters keep the counts made
    /// during the descent.
    pub fn restore_relative_class_and_subclass_only(&mut self, snapshot: &MatchResult) {
        self.relative.class = snapshot.relative.class.clone();
        self.relative.subclass = snapshot.relative.subclass.clone();
    }
}

/// Counter state captured at the moment a definition matched.
///
/// Owns its own maps; later tracker mutations never show through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    relative: KeyedCounts,
    absolute: KeyedCounts,
    object: usize,
    absolute_object: usize,
}

impl MatchResult {
    pub fn get(&self, kind: CounterKind, key: &str) -> usize {
        self.relative.get(kind, key)
    }

    pub fn get_absolute(&self, kind: CounterKind, key: &str) -> usize {
        self.absolute.get(kind, key)
    }

    pub fn object(&self) -> usize {
        self.object
    }

    pub fn absolute_object(&self) -> usize {
        self.absolute_object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    fn assert_absolute_dominates(tracker: &IndexTracker, keys: &[&str]) {
        for kind in CounterKind::iter() {
            for key in keys {
                assert!(
                    tracker.get_absolute(kind, key) >= tracker.get(kind, key),
                    "absolute < relative for {kind}/{key}"
                );
            }
        }
        assert!(tracker.absolute_object() >= tracker.object());
    }

    #[test]
    fn test_increment_returns_relative_count() {
        let mut tracker = IndexTracker::new();
        assert_eq!(tracker.increment(CounterKind::Class, "Foo"), 1);
        assert_eq!(tracker.increment(CounterKind::Class, "Foo"), 2);
        assert_eq!(tracker.increment(CounterKind::Class, "Bar"), 1);
        assert_eq!(tracker.get(CounterKind::Class, "Foo"), 2);
        assert_eq!(tracker.get(CounterKind::Name, "Foo"), 0);
    }

    #[test]
    fn test_relative_equals_absolute_until_reset() {
        let mut tracker = IndexTracker::new();
        let keys = ["Foo", "Bar"];
        for key in keys.iter().cycle().take(5) {
            for kind in CounterKind::iter() {
                tracker.increment(kind, key);
            }
            tracker.increment_object();
        }
        for kind in CounterKind::iter() {
            for key in keys {
                assert_eq!(tracker.get(kind, key), tracker.get_absolute(kind, key));
            }
        }
        assert_eq!(tracker.object(), tracker.absolute_object());

        tracker.reset_relative();
        tracker.increment(CounterKind::Class, "Foo");
        assert_absolute_dominates(&tracker, &keys);
        assert!(
            tracker.get_absolute(CounterKind::Class, "Foo") > tracker.get(CounterKind::Class, "Foo")
        );
    }

    #[test]
    fn test_reset_relative_leaves_absolute_untouched() {
        let mut tracker = IndexTracker::new();
        tracker.increment(CounterKind::Type, "button");
        tracker.increment(CounterKind::Id, "42");
        tracker.increment_object();

        tracker.reset_relative();

        assert_eq!(tracker.get(CounterKind::Type, "button"), 0);
        assert_eq!(tracker.get_absolute(CounterKind::Type, "button"), 1);
        assert_eq!(tracker.get_absolute(CounterKind::Id, "42"), 1);
        assert_eq!(tracker.object(), 0);
        assert_eq!(tracker.absolute_object(), 1);
    }

    #[test]
    fn test_restore_full_after_snapshot_is_identity() {
        let mut tracker = IndexTracker::new();
        tracker.increment(CounterKind::Class, "Foo");
        tracker.increment(CounterKind::Subclass, "View");
        tracker.increment_object();

        let snapshot = tracker.snapshot();
        tracker.restore_full(&snapshot);
        assert_eq!(tracker.snapshot(), snapshot);

        tracker.increment(CounterKind::Class, "Foo");
        tracker.reset_relative();
        tracker.restore_full(&snapshot);
        assert_eq!(tracker.snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_does_not_alias_tracker() {
        let mut tracker = IndexTracker::new();
        tracker.increment(CounterKind::Class, "Foo");
        let snapshot = tracker.snapshot();

        tracker.increment(CounterKind::Class, "Foo");
        tracker.reset_relative();

        assert_eq!(snapshot.get(CounterKind::Class, "Foo"), 1);
        assert_eq!(snapshot.get_absolute(CounterKind::Class, "Foo"), 1);
    }

    #[test]
    fn test_partial_restore_rolls_back_class_and_subclass_only() {
        let mut tracker = IndexTracker::new();
        tracker.increment(CounterKind::Class, "Foo");
        let saved = tracker.snapshot();

        tracker.increment(CounterKind::Class, "Foo");
        tracker.increment(CounterKind::Subclass, "View");
        tracker.increment(CounterKind::Name, "ok");
        tracker.increment(CounterKind::Type, "button");
        tracker.increment_object();

        tracker.restore_relative_class_and_subclass_only(&saved);

        assert_eq!(tracker.get(CounterKind::Class, "Foo"), 1);
        assert_eq!(tracker.get(CounterKind::Subclass, "View"), 0);
        assert_eq!(tracker.get(CounterKind::Name, "ok"), 1);
        assert_eq!(tracker.get(CounterKind::Type, "button"), 1);
        assert_eq!(tracker.object(), 1);
        assert_eq!(tracker.get_absolute(CounterKind::Class, "Foo"), 2);
        assert_eq!(tracker.get_absolute(CounterKind::Subclass, "View"), 1);
    }

    #[test]
    fn test_match_result_serializes_counter_maps() {
        let mut tracker = IndexTracker::new();
        tracker.increment(CounterKind::Type, "button");
        tracker.increment_object();

        let json = serde_json::to_value(tracker.snapshot()).unwrap();
        assert_eq!(json["relative"]["type"]["button"], 1);
        assert_eq!(json["absolute"]["type"]["button"], 1);
        assert_eq!(json["object"], 1);
        assert_eq!(json["absolute_object"], 1);
    }

    #[test]
    fn test_type_key_is_lowercase() {
        assert_eq!(type_key("PushButton"), "pushbutton");
    }
}
