//! The whole remote document: account email -> that account's entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::exercise::{EntryId, Exercise};

/// Every account's exercise history, stored as one JSON document.
///
/// Accounts live in a BTreeMap so the document serializes with a stable
/// key order, which keeps revision hashes deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Logbook {
    accounts: BTreeMap<String, Vec<Exercise>>,
}

impl Logbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for an account, oldest first. Unknown accounts are empty.
    pub fn entries(&self, account: &str) -> &[Exercise] {
        self.accounts.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the document has a sequence for this account.
    pub fn has_account(&self, account: &str) -> bool {
        self.accounts.contains_key(account)
    }

    /// Appends an entry, creating the account's sequence on first use.
    pub fn append(&mut self, account: &str, exercise: Exercise) {
        self.accounts
            .entry(account.to_string())
            .or_default()
            .push(exercise);
    }

    /// Removes every entry with the given id from the account's sequence.
    ///
    /// Returns true if anything was removed. Unknown accounts and ids are
    /// no-ops.
    pub fn remove(&mut self, account: &str, id: EntryId) -> bool {
        match self.accounts.get_mut(account) {
            Some(entries) => {
                let before = entries.len();
                entries.retain(|e| e.id != id);
                entries.len() != before
            }
            None => false,
        }
    }

    /// Allocates the id for the account's next entry.
    ///
    /// Ids are epoch milliseconds bumped past the account's current
    /// maximum, so appends within one millisecond stay distinct.
    pub fn allocate_id(&self, account: &str) -> EntryId {
        EntryId::after(self.entries(account).iter().map(|e| e.id).max())
    }

    /// Account emails present in the document.
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightUnit;

    fn entry(id: i64, name: &str) -> Exercise {
        Exercise {
            id: EntryId(id),
            week: 1,
            day: "Day 1".to_string(),
            name: name.to_string(),
            sets: 3,
            reps: 8,
            weight: 100.0,
            unit: WeightUnit::Kg,
            date: "2026-08-21".to_string(),
        }
    }

    #[test]
    fn test_entries_unknown_account_empty() {
        let logbook = Logbook::new();
        assert!(logbook.entries("nobody@example.com").is_empty());
        assert!(!logbook.has_account("nobody@example.com"));
    }

    #[test]
    fn test_append_creates_account() {
        let mut logbook = Logbook::new();
        logbook.append("a@example.com", entry(1, "Squat"));

        assert!(logbook.has_account("a@example.com"));
        assert_eq!(logbook.entries("a@example.com").len(), 1);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut logbook = Logbook::new();
        logbook.append("a@example.com", entry(1, "Squat"));
        logbook.append("a@example.com", entry(2, "Bench Press"));
        logbook.append("a@example.com", entry(3, "Deadlift"));

        let names: Vec<&str> = logbook
            .entries("a@example.com")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["Squat", "Bench Press", "Deadlift"]);
    }

    #[test]
    fn test_remove_keeps_others_in_order() {
        let mut logbook = Logbook::new();
        logbook.append("a@example.com", entry(1, "Squat"));
        logbook.append("a@example.com", entry(2, "Bench Press"));
        logbook.append("a@example.com", entry(3, "Deadlift"));

        assert!(logbook.remove("a@example.com", EntryId(2)));

        let names: Vec<&str> = logbook
            .entries("a@example.com")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["Squat", "Deadlift"]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut logbook = Logbook::new();
        logbook.append("a@example.com", entry(1, "Squat"));

        let before = logbook.clone();
        assert!(!logbook.remove("a@example.com", EntryId(999)));
        assert_eq!(logbook, before);
    }

    #[test]
    fn test_remove_unknown_account_is_noop() {
        let mut logbook = Logbook::new();
        assert!(!logbook.remove("nobody@example.com", EntryId(1)));
        assert!(logbook.is_empty());
    }

    #[test]
    fn test_accounts_are_isolated() {
        let mut logbook = Logbook::new();
        logbook.append("a@example.com", entry(1, "Squat"));
        logbook.append("b@example.com", entry(2, "Bench Press"));

        assert_eq!(logbook.entries("a@example.com").len(), 1);
        assert_eq!(logbook.entries("a@example.com")[0].name, "Squat");
        assert_eq!(logbook.entries("b@example.com").len(), 1);
        assert_eq!(logbook.entries("b@example.com")[0].name, "Bench Press");

        logbook.remove("a@example.com", EntryId(1));
        assert_eq!(logbook.entries("b@example.com").len(), 1);
    }

    #[test]
    fn test_allocate_id_distinct_and_increasing() {
        let mut logbook = Logbook::new();
        let mut ids = Vec::new();

        for i in 0..5 {
            let id = logbook.allocate_id("a@example.com");
            logbook.append("a@example.com", {
                let mut e = entry(0, "Squat");
                e.id = id;
                e
            });
            ids.push(id);
            if i > 0 {
                assert!(ids[i] > ids[i - 1]);
            }
        }

        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), 5);
    }

    #[test]
    fn test_json_document_shape() {
        let mut logbook = Logbook::new();
        logbook.append("a@example.com", entry(1, "Squat"));

        let json = serde_json::to_value(&logbook).unwrap();
        assert!(json.is_object());
        assert_eq!(json["a@example.com"][0]["name"], "Squat");
        assert_eq!(json["a@example.com"][0]["id"], 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut logbook = Logbook::new();
        logbook.append("a@example.com", entry(1, "Squat"));
        logbook.append("b@example.com", entry(2, "Bench Press"));

        let json = serde_json::to_string(&logbook).unwrap();
        let parsed: Logbook = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, logbook);
    }

    #[test]
    fn test_accounts_iterator_sorted() {
        let mut logbook = Logbook::new();
        logbook.append("b@example.com", entry(1, "Squat"));
        logbook.append("a@example.com", entry(2, "Bench Press"));

        let accounts: Vec<&str> = logbook.accounts().collect();
        assert_eq!(accounts, ["a@example.com", "b@example.com"]);
    }
}
