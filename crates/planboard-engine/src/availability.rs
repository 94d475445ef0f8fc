//! Memoized per-date personnel conflict lookups.
//!
//! Keyed by (date, reference project): the same person can be busy relative
//! to one project row and free relative to another. There is no TTL;
//! correctness relies on explicit invalidation at the selection boundaries,
//! with a documented staleness window between them.

use std::collections::HashMap;

use chrono::NaiveDate;
use planboard_core::{AssignedPerson, PersonDayStatus, PersonId, ProjectId};

/// One memoized lookup result for a (date, reference project) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayConflicts {
    /// Explicit day statuses; missing people are available.
    pub statuses: HashMap<PersonId, PersonDayStatus>,
    /// People already assigned to a different project that day.
    pub busy: Vec<AssignedPerson>,
}

impl DayConflicts {
    /// Looks up the busy record of one person, if any.
    pub fn busy_entry(&self, person: PersonId) -> Option<&AssignedPerson> {
        self.busy.iter().find(|entry| entry.person == person)
    }
}

/// Cache of conflict lookups for the active session.
#[derive(Debug, Default)]
pub struct AvailabilityCache {
    /// Memoized results.
    entries: HashMap<(NaiveDate, ProjectId), DayConflicts>,
}

impl AvailabilityCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized result for a pair, if present.
    pub fn lookup(&self, date: NaiveDate, reference: ProjectId) -> Option<&DayConflicts> {
        self.entries.get(&(date, reference))
    }

    /// Memoizes a lookup result.
    pub fn store(&mut self, date: NaiveDate, reference: ProjectId, conflicts: DayConflicts) {
        self.entries.insert((date, reference), conflicts);
    }

    /// Drops every entry.
    ///
    /// Called when the active selection changes, when the edit surface is
    /// reopened on a different coordinate, or on explicit refresh.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
