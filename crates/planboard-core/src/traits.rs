use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::week::WeekStart;
use crate::{
    AssignedPerson, Cell, CellCoord, CellFields, CopySummary, MoveMode, PersonDayStatus, PersonId,
    ProjectId, Result, SaveOutcome, SyncToken, WeekData,
};

/// Boundary to the shared remote store holding the board.
///
/// Every mutation round-trips through an implementation of this trait; the
/// engines never treat local state as authoritative before a call here has
/// confirmed the write.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Fetches the authoritative content of one cell.
    ///
    /// Returns `None` when the cell was never saved.
    ///
    /// # Errors
    ///
    /// Returns an error when the store is unreachable or the payload is
    /// malformed.
    async fn get_cell(&self, coord: CellCoord) -> Result<Option<Cell>>;

    /// Writes one cell, creating it implicitly on first save.
    ///
    /// `person_ids` replaces the assigned set wholesale. With
    /// `override_conflicts` the caller acknowledges double-booking; statuses
    /// `leave`, `office`, and `production` still reject regardless.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Blocked`] with the conflicting people, or a
    /// transport error. Nothing is written on failure.
    async fn save_cell(
        &self,
        coord: CellCoord,
        fields: &CellFields,
        person_ids: &[PersonId],
        override_conflicts: bool,
    ) -> Result<SaveOutcome>;

    /// Resets every field of one cell, attachments included.
    ///
    /// The grid position itself survives; a cleared cell reads back empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects the clear.
    async fn clear_cell(&self, coord: CellCoord) -> Result<()>;

    /// Moves or swaps the full contents of two cells in one request.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects the move; neither cell is
    /// changed in that case.
    async fn move_cell(&self, from: CellCoord, to: CellCoord, mode: MoveMode) -> Result<()>;

    /// Duplicates a project's Monday cell onto the other six days.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects the copy.
    async fn copy_day_to_week(&self, project: ProjectId, week: WeekStart) -> Result<CopySummary>;

    /// Duplicates the whole week onto the following week.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects the copy.
    async fn copy_week_to_next(&self, week: WeekStart) -> Result<CopySummary>;

    /// Fills the given week from the preceding one.
    ///
    /// # Errors
    ///
    /// Returns an error when the preceding week holds nothing to copy or
    /// the store rejects the copy.
    async fn copy_week_from_previous(&self, week: WeekStart) -> Result<CopySummary>;

    /// Lists people already assigned to a different project on `date`.
    ///
    /// "Different" is relative to `reference`: the same person can be busy
    /// relative to one project row and free relative to another.
    ///
    /// # Errors
    ///
    /// Returns an error when the store is unreachable.
    async fn assigned_elsewhere(
        &self,
        date: NaiveDate,
        reference: ProjectId,
    ) -> Result<Vec<AssignedPerson>>;

    /// Fetches the explicit day statuses for `date`.
    ///
    /// People missing from the map count as available.
    ///
    /// # Errors
    ///
    /// Returns an error when the store is unreachable.
    async fn person_statuses(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<PersonId, PersonDayStatus>>;

    /// Fetches the staleness token for a week.
    ///
    /// Returns `None` while the week has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error when the store is unreachable.
    async fn sync_token(&self, week: WeekStart) -> Result<Option<SyncToken>>;

    /// Fetches the full contents of a week for a wholesale rebuild.
    ///
    /// # Errors
    ///
    /// Returns an error when the store is unreachable.
    async fn week_cells(&self, week: WeekStart) -> Result<WeekData>;
}
