//! Cell copy, click-paste, and paint-mode bulk paste.
//!
//! Copy snapshots the writable fields and people of a cell; attachments
//! and references stay behind. The snapshot is read back from the store
//! rather than the local grid, so a copy taken between reconcile ticks
//! never captures stale state. Paste replays the snapshot through the
//! ordinary save path, so conflict policy and capability gating apply
//! unchanged. Paint mode turns hover into paste while the pointer is held,
//! with a last-painted latch so a cell is pasted once per pass.

use std::sync::Arc;

use planboard_core::{CellCoord, ClipboardPayload, Error, PlanStore, Result, SaveOutcome};
use tracing::debug;

use crate::mutation::MutationClient;
use crate::session::Session;

/// Copy and paste operations for one session.
#[derive(Clone)]
pub struct ClipboardEngine {
    /// Remote store the copy snapshot is read from.
    store: Arc<dyn PlanStore>,
    /// Session holding the clipboard and paint flags.
    session: Session,
    /// Save path every paste goes through.
    mutation: MutationClient,
}

impl ClipboardEngine {
    /// Creates an engine bound to one session.
    pub fn new(store: Arc<dyn PlanStore>, session: Session, mutation: MutationClient) -> Self {
        Self {
            store,
            session,
            mutation,
        }
    }

    /// Copies the authoritative content of a cell into the session
    /// clipboard.
    ///
    /// A never-saved cell yields an empty payload; pasting that is a valid
    /// way to blank cells. On a fetch failure the held clipboard is left
    /// as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`](planboard_core::Error::ReadOnly) for
    /// observers and any store error as-is.
    pub async fn copy(&self, coord: CellCoord) -> Result<()> {
        self.session.ensure_editable()?;
        let cell = self.store.get_cell(coord).await?.unwrap_or_default();
        self.session
            .set_clipboard(Some(ClipboardPayload::from_cell(&cell)));
        debug!(%coord, "cell copied");
        Ok(())
    }

    /// Pastes the clipboard onto one cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyClipboard`] when nothing was copied, and
    /// otherwise whatever the save path returns, including
    /// [`Error::Blocked`] for people unavailable on the target date.
    pub async fn paste_one(&self, coord: CellCoord) -> Result<SaveOutcome> {
        let payload = self.session.clipboard().ok_or(Error::EmptyClipboard)?;
        self.mutation
            .save(coord, &payload.to_fields(), &payload.person_ids, false)
            .await
    }

    /// Turns paint mode on or off.
    pub fn set_paint_mode(&self, enabled: bool) {
        self.session.set_paint_mode(enabled);
    }

    /// Records the pointer going down, arming the paint gesture.
    pub fn pointer_pressed(&self) {
        self.session.pointer_pressed();
    }

    /// Records the pointer release, ending the paint gesture.
    pub fn pointer_released(&self) {
        self.session.pointer_released();
    }

    /// Handles the pointer entering a cell during a paint gesture.
    ///
    /// Returns `Ok(false)` when nothing was painted: paint mode off,
    /// pointer up, or the cell was already painted on this pass. The
    /// painted latch is set before the paste, so a failing cell is not
    /// retried while the pointer rests on it.
    ///
    /// # Errors
    ///
    /// Propagates paste failures; the latch stays set.
    pub async fn paint_enter(&self, coord: CellCoord) -> Result<bool> {
        if !self.session.paint_ready() {
            return Ok(false);
        }
        if !self.session.try_mark_painted(coord) {
            return Ok(false);
        }
        self.paste_one(coord).await?;
        Ok(true)
    }
}
