//! Week-scale duplication commands.
//!
//! Three bulk operations the store executes server-side: fill a project
//! row from its Monday cell, push the whole week onto the next one, and
//! pull the previous week into this one. Each returns a summary so hosts
//! can report partial results; afterwards the grid is rebuilt from the
//! store rather than patched cell by cell.

use std::sync::Arc;

use planboard_core::{CopySummary, PlanStore, ProjectId, Result};
use tracing::info;

use crate::session::Session;

/// Bulk duplication commands for one session.
#[derive(Clone)]
pub struct WeekCopyEngine {
    /// Remote store executing the copies.
    store: Arc<dyn PlanStore>,
    /// Session whose week the commands target.
    session: Session,
}

impl WeekCopyEngine {
    /// Creates an engine bound to one session.
    pub fn new(store: Arc<dyn PlanStore>, session: Session) -> Self {
        Self { store, session }
    }

    /// Rebuilds the grid from the store after a bulk copy.
    async fn rebuild(&self) -> Result<()> {
        let data = self.store.week_cells(self.session.week()).await?;
        self.session.with_grid(|grid| {
            grid.replace_all(data);
            grid.recompute_all_vehicles();
        });
        Ok(())
    }

    /// Copies a project row's Monday cell onto the rest of its week.
    ///
    /// # Errors
    ///
    /// Returns [`planboard_core::Error::ReadOnly`] for observers and any
    /// store error as-is.
    pub async fn duplicate_monday(&self, project: ProjectId) -> Result<CopySummary> {
        self.session.ensure_editable()?;
        let _pass = self.session.begin_mutation();
        let summary = self
            .store
            .copy_day_to_week(project, self.session.week())
            .await?;
        self.rebuild().await?;
        info!(%project, copied = summary.copied, "monday duplicated across the week");
        Ok(summary)
    }

    /// Copies the viewed week onto the following one.
    ///
    /// The viewed week itself does not change, so no rebuild happens.
    ///
    /// # Errors
    ///
    /// Returns [`planboard_core::Error::ReadOnly`] for observers and any
    /// store error as-is.
    pub async fn push_to_next_week(&self) -> Result<CopySummary> {
        self.session.ensure_editable()?;
        let _pass = self.session.begin_mutation();
        let summary = self.store.copy_week_to_next(self.session.week()).await?;
        info!(copied = summary.copied, "week pushed onto the next one");
        Ok(summary)
    }

    /// Fills the viewed week from the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`planboard_core::Error::ReadOnly`] for observers, a store
    /// error when the previous week is empty, and any other store error
    /// as-is.
    pub async fn pull_from_previous_week(&self) -> Result<CopySummary> {
        self.session.ensure_editable()?;
        let _pass = self.session.begin_mutation();
        let summary = self
            .store
            .copy_week_from_previous(self.session.week())
            .await?;
        self.rebuild().await?;
        info!(copied = summary.copied, "week filled from the previous one");
        Ok(summary)
    }
}
