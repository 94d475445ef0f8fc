//! Save and clear commands.
//!
//! Both commands are optimistic about concurrency and strict about
//! ordering: the remote store confirms first, and only then is the local
//! grid touched. A rejected or failed write leaves the grid exactly as it
//! was.

use std::sync::Arc;

use planboard_core::{
    CellCoord, CellFields, Error, PersonId, PlanStore, ProjectId, Result, SaveOutcome,
};
use tracing::{debug, info, warn};

use crate::conflict::ConflictResolver;
use crate::session::Session;

/// Destructive-action confirmation seam.
///
/// The engine never renders UI; hosts inject whatever prompt fits them.
pub trait ConfirmGuard: Send + Sync {
    /// Returns `true` when the user approved the action.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Guard that approves everything, for hosts without prompts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmGuard for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Issues cell mutations against the remote store.
#[derive(Clone)]
pub struct MutationClient {
    /// Remote store the writes go to.
    store: Arc<dyn PlanStore>,
    /// Session owning the grid being mirrored.
    session: Session,
    /// Pre-commit conflict policy.
    resolver: ConflictResolver,
    /// Confirmation seam for destructive commands.
    confirm: Arc<dyn ConfirmGuard>,
}

impl MutationClient {
    /// Creates a client bound to one session.
    pub fn new(
        store: Arc<dyn PlanStore>,
        session: Session,
        resolver: ConflictResolver,
        confirm: Arc<dyn ConfirmGuard>,
    ) -> Self {
        Self {
            store,
            session,
            resolver,
            confirm,
        }
    }

    fn validate(coord: CellCoord) -> Result<()> {
        if coord.project.0 > 0 {
            Ok(())
        } else {
            Err(Error::InvalidCoord(coord.to_string()))
        }
    }

    /// Saves a cell: fields plus the full replacement people set.
    ///
    /// The local grid is updated only after the store confirms; afterwards
    /// the row vehicle is re-derived, the people are recorded as recently
    /// used, and the week token is refreshed so the saver's own write never
    /// reads as foreign staleness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] for observers, [`Error::InvalidCoord`]
    /// for a non-positive project id, [`Error::Blocked`] when the conflict
    /// policy or the store rejects people, and any store error as-is.
    pub async fn save(
        &self,
        coord: CellCoord,
        fields: &CellFields,
        person_ids: &[PersonId],
        allow_conflicting: bool,
    ) -> Result<SaveOutcome> {
        self.session.ensure_editable()?;
        Self::validate(coord)?;
        let _pass = self.session.begin_mutation();

        self.resolver
            .check(coord, person_ids, allow_conflicting)
            .await?;
        let outcome = self
            .store
            .save_cell(coord, fields, person_ids, allow_conflicting)
            .await?;

        self.session.with_grid(|grid| {
            grid.apply_local_update(coord, fields, person_ids);
            if fields.team_name.is_empty() && !outcome.team_name.is_empty() {
                grid.set_cell_team_name(coord, outcome.team_name.clone());
            }
            grid.recompute_vehicle(coord.project);
        });
        self.session.record_recent_people(person_ids);
        self.refresh_own_token().await;

        info!(%coord, people = person_ids.len(), "cell saved");
        Ok(outcome)
    }

    /// Clears a cell after confirmation, keeping its grid position.
    ///
    /// Returns `Ok(false)` when the user declined the prompt. Clearing
    /// does not refresh the week token; the next reconciliation pass picks
    /// the change up like any other.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] for observers, [`Error::InvalidCoord`]
    /// for a non-positive project id, and any store error as-is.
    pub async fn clear(&self, coord: CellCoord) -> Result<bool> {
        self.session.ensure_editable()?;
        Self::validate(coord)?;
        if !self.confirm.confirm(&format!("Clear cell {coord}?")) {
            debug!(%coord, "clear declined");
            return Ok(false);
        }
        let _pass = self.session.begin_mutation();

        self.store.clear_cell(coord).await?;
        self.session.with_grid(|grid| {
            grid.clear_local(coord);
            grid.recompute_vehicle(coord.project);
        });

        info!(%coord, "cell cleared");
        Ok(true)
    }

    /// Refreshes the session token right after an own write.
    ///
    /// A failure here only risks one spurious rebuild later, so it is
    /// logged and swallowed.
    async fn refresh_own_token(&self) {
        match self.store.sync_token(self.session.week()).await {
            Ok(token) => self.session.set_sync_token(token),
            Err(error) => warn!(%error, "token refresh after save failed"),
        }
    }

    /// Session this client mutates through.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Re-derives the vehicle plate of one row from the local grid.
    pub fn refresh_row_vehicle(&self, project: ProjectId) {
        self.session
            .with_grid(|grid| grid.recompute_vehicle(project));
    }
}
