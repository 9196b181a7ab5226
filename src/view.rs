//! Week-scoped projection of an account's history.
//!
//! The history view shows one training week at a time. A [`WeekView`]
//! keeps the full sequence, the current selection, and derived state for
//! rendering: the visible subset, recomputed whenever the selection or the
//! source sequence changes, and the distinct week values for the selector,
//! recomputed only when the source sequence changes.

use crate::models::Exercise;

#[derive(Debug, Clone)]
pub struct WeekView {
    entries: Vec<Exercise>,
    selected: Option<u32>,
    weeks: Vec<u32>,
    visible: Vec<Exercise>,
}

impl WeekView {
    /// Creates a view over a sequence with no week selected.
    pub fn new(entries: Vec<Exercise>) -> Self {
        let mut view = Self {
            entries,
            selected: None,
            weeks: Vec::new(),
            visible: Vec::new(),
        };
        view.refresh();
        view
    }

    /// Replaces the source sequence.
    pub fn set_entries(&mut self, entries: Vec<Exercise>) {
        self.entries = entries;
        self.refresh();
    }

    /// Selects a week, or clears the selection with `None`.
    pub fn select(&mut self, week: Option<u32>) {
        if self.selected != week {
            self.selected = week;
            self.refresh_visible();
        }
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Distinct week values in the sequence, sorted ascending.
    pub fn weeks(&self) -> &[u32] {
        &self.weeks
    }

    /// Entries visible under the current selection, in storage order.
    pub fn visible(&self) -> &[Exercise] {
        &self.visible
    }

    /// Consumes the view, returning the visible entries.
    pub fn into_visible(self) -> Vec<Exercise> {
        self.visible
    }

    fn refresh(&mut self) {
        self.weeks = distinct_weeks(&self.entries);
        self.refresh_visible();
    }

    fn refresh_visible(&mut self) {
        self.visible = match self.selected {
            Some(week) => self
                .entries
                .iter()
                .filter(|e| e.week == week)
                .cloned()
                .collect(),
            None => self.entries.clone(),
        };
    }
}

/// Distinct week values in a sequence, sorted ascending.
pub fn distinct_weeks(entries: &[Exercise]) -> Vec<u32> {
    let mut weeks: Vec<u32> = entries.iter().map(|e| e.week).collect();
    weeks.sort_unstable();
    weeks.dedup();
    weeks
}
