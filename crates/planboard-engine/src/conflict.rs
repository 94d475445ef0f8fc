//! Pre-commit personnel conflict policy.
//!
//! Two tiers: hard day statuses (leave, office, production) always block,
//! while being assigned to a different project the same day blocks only
//! until the user overrides. The store re-validates hard statuses on every
//! write, so a stale cache here can cost a round trip but never corrupt
//! the board.

use std::sync::Arc;

use planboard_core::{
    BlockedEntry, BlockedStatus, CellCoord, Error, PersonId, PlanStore, Result,
};
use tracing::debug;

use crate::availability::DayConflicts;
use crate::session::Session;

/// Validates a people selection against day statuses and other rows.
#[derive(Clone)]
pub struct ConflictResolver {
    /// Remote store the lookups come from.
    store: Arc<dyn PlanStore>,
    /// Session owning the availability cache.
    session: Session,
}

impl ConflictResolver {
    /// Creates a resolver bound to one session.
    pub fn new(store: Arc<dyn PlanStore>, session: Session) -> Self {
        Self { store, session }
    }

    /// Conflict data for a date relative to a reference project.
    ///
    /// Served from the session cache when present, otherwise fetched and
    /// memoized.
    ///
    /// # Errors
    ///
    /// Returns an error when either remote lookup fails; nothing is
    /// memoized in that case.
    pub async fn day_conflicts(
        &self,
        coord: CellCoord,
    ) -> Result<DayConflicts> {
        if let Some(hit) = self
            .session
            .with_cache(|cache| cache.lookup(coord.date, coord.project).cloned())
        {
            return Ok(hit);
        }

        let statuses = self.store.person_statuses(coord.date).await?;
        let busy = self
            .store
            .assigned_elsewhere(coord.date, coord.project)
            .await?;
        let conflicts = DayConflicts { statuses, busy };
        debug!(%coord, busy = conflicts.busy.len(), "conflict lookup fetched");
        self.session.with_cache(|cache| {
            cache.store(coord.date, coord.project, conflicts.clone());
        });
        Ok(conflicts)
    }

    /// Checks a selection before commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Blocked`] listing every excluded person: all
    /// hard-status people, plus people busy on another project unless
    /// `allow_conflicting` is set. Lookup failures propagate as-is.
    pub async fn check(
        &self,
        coord: CellCoord,
        person_ids: &[PersonId],
        allow_conflicting: bool,
    ) -> Result<()> {
        if person_ids.is_empty() {
            return Ok(());
        }
        let conflicts = self.day_conflicts(coord).await?;

        let mut blocked = Vec::new();
        for person in person_ids {
            if let Some(status) = conflicts.statuses.get(person)
                && let Some(reason) = BlockedStatus::from_day_status(*status)
            {
                blocked.push(BlockedEntry {
                    person: *person,
                    full_name: self.session.person_name(*person),
                    status: reason,
                });
                continue;
            }
            if !allow_conflicting && let Some(busy) = conflicts.busy_entry(*person) {
                blocked.push(BlockedEntry {
                    person: *person,
                    full_name: busy.full_name.clone(),
                    status: BlockedStatus::BusyElsewhere {
                        project_code: busy.project_code.clone(),
                    },
                });
            }
        }

        if blocked.is_empty() {
            Ok(())
        } else {
            Err(Error::Blocked(blocked))
        }
    }

    /// Drops every memoized lookup, forcing fresh data on the next check.
    pub fn invalidate(&self) {
        self.session.refresh_availability();
    }
}
