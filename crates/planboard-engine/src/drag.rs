//! Pointer-drag exchange of two cells.
//!
//! A three-phase gesture: begin on a source cell, hover over candidate
//! targets, commit on drop. Nothing touches the network until commit, so a
//! cancelled drag costs nothing. Commit always exchanges the two cells in
//! full; there is no merge.

use std::sync::Arc;

use planboard_core::{CellCoord, MoveMode, PlanStore, Result};
use tracing::{debug, info};

use crate::session::Session;

/// Where the drag gesture currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No gesture in flight.
    Idle,
    /// Pointer is down on a source cell.
    Dragging {
        /// Cell the gesture started on.
        from: CellCoord,
    },
    /// Pointer is over a candidate target.
    Hovering {
        /// Cell the gesture started on.
        from: CellCoord,
        /// Cell currently under the pointer.
        over: CellCoord,
    },
}

/// Drives the drag-swap gesture for one session.
pub struct DragMoveEngine {
    /// Remote store the swap is committed to.
    store: Arc<dyn PlanStore>,
    /// Session owning the grid affordance.
    session: Session,
    /// Current gesture phase.
    phase: DragPhase,
}

impl DragMoveEngine {
    /// Creates an idle engine bound to one session.
    pub fn new(store: Arc<dyn PlanStore>, session: Session) -> Self {
        Self {
            store,
            session,
            phase: DragPhase::Idle,
        }
    }

    /// Current gesture phase.
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Starts a gesture on a source cell.
    ///
    /// # Errors
    ///
    /// Returns [`planboard_core::Error::ReadOnly`] for observers; the
    /// gesture does not start.
    pub fn begin(&mut self, from: CellCoord) -> Result<()> {
        self.session.ensure_editable()?;
        self.phase = DragPhase::Dragging { from };
        self.session
            .with_grid(|grid| grid.set_drag_source(Some(from)));
        debug!(%from, "drag started");
        Ok(())
    }

    /// Records the pointer entering a candidate target.
    pub fn hover_enter(&mut self, over: CellCoord) {
        if let DragPhase::Dragging { from } | DragPhase::Hovering { from, .. } = self.phase {
            self.phase = DragPhase::Hovering { from, over };
        }
    }

    /// Records the pointer leaving the current candidate target.
    pub fn hover_leave(&mut self) {
        if let DragPhase::Hovering { from, .. } = self.phase {
            self.phase = DragPhase::Dragging { from };
        }
    }

    /// Abandons the gesture with no network traffic.
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
        self.session.with_grid(|grid| grid.set_drag_source(None));
    }

    /// Commits the gesture, swapping source and target in full.
    ///
    /// Dropping outside a target or back on the source is a silent cancel.
    /// The affordance is cleared whether the swap succeeds or not; on
    /// success both cells are refreshed from the store and both row
    /// vehicles re-derived.
    ///
    /// # Errors
    ///
    /// Returns the store error when the swap or the follow-up refresh
    /// fails; local state then still shows the pre-drag truth.
    pub async fn commit(&mut self) -> Result<()> {
        let DragPhase::Hovering { from, over } = self.phase else {
            self.cancel();
            return Ok(());
        };
        if from == over {
            self.cancel();
            return Ok(());
        }
        self.cancel();

        let _pass = self.session.begin_mutation();
        self.store.move_cell(from, over, MoveMode::Swap).await?;

        for coord in [from, over] {
            let cell = self.store.get_cell(coord).await?;
            self.session.with_grid(|grid| grid.apply_cell(coord, cell));
        }
        let mut projects = vec![from.project, over.project];
        projects.dedup();
        self.session.with_grid(|grid| {
            for project in projects {
                grid.recompute_vehicle(project);
            }
        });

        info!(%from, %over, "cells swapped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use planboard_core::{Cell, Error, ProjectId, WeekStart};
    use planboard_store::MemoryPlanStore;
    use crate::session::SessionRole;

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap_or_default()
    }

    fn engine(store: &MemoryPlanStore, role: SessionRole) -> DragMoveEngine {
        let session = Session::new(role, WeekStart::containing(june(10)));
        DragMoveEngine::new(Arc::new(store.clone()), session)
    }

    fn seeded_store() -> (MemoryPlanStore, CellCoord, CellCoord) {
        let left = CellCoord::new(ProjectId(7), june(10));
        let right = CellCoord::new(ProjectId(9), june(11));
        let store = MemoryPlanStore::new()
            .with_cell(
                left,
                Cell {
                    shift: "08:30-18:00".to_owned(),
                    vehicle_info: "34ABC123 Transit".to_owned(),
                    ..Cell::default()
                },
            )
            .with_cell(
                right,
                Cell {
                    shift: "10:00-20:00".to_owned(),
                    ..Cell::default()
                },
            );
        (store, left, right)
    }

    #[tokio::test]
    async fn test_commit_swaps_and_refreshes_locally() {
        let (store, left, right) = seeded_store();
        let mut engine = engine(&store, SessionRole::Editor);

        assert!(engine.begin(left).is_ok());
        engine.hover_enter(right);
        assert!(engine.commit().await.is_ok());

        assert_eq!(engine.phase(), DragPhase::Idle);
        let swapped = engine
            .session
            .with_grid(|grid| grid.cell(right).cloned());
        assert!(swapped.is_some_and(|cell| cell.shift == "08:30-18:00"));
        let plate = engine
            .session
            .with_grid(|grid| grid.vehicle_summary(ProjectId(9)).map(ToOwned::to_owned));
        assert_eq!(plate.as_deref(), Some("34ABC123"), "plate moved with the cell");
    }

    #[tokio::test]
    async fn test_drop_outside_target_cancels_silently() {
        let (store, left, _) = seeded_store();
        let mut engine = engine(&store, SessionRole::Editor);

        assert!(engine.begin(left).is_ok());
        assert!(engine.commit().await.is_ok(), "no hover target means cancel");
        assert_eq!(store.call_count("move_cell"), 0);
        assert!(engine.session.with_grid(|grid| grid.drag_source().is_none()));
    }

    #[tokio::test]
    async fn test_drop_on_source_cancels_silently() {
        let (store, left, _) = seeded_store();
        let mut engine = engine(&store, SessionRole::Editor);

        assert!(engine.begin(left).is_ok());
        engine.hover_enter(left);
        assert!(engine.commit().await.is_ok());
        assert_eq!(store.call_count("move_cell"), 0);
    }

    #[tokio::test]
    async fn test_hover_leave_returns_to_dragging() {
        let (store, left, right) = seeded_store();
        let mut engine = engine(&store, SessionRole::Editor);

        assert!(engine.begin(left).is_ok());
        engine.hover_enter(right);
        assert_eq!(engine.phase(), DragPhase::Hovering { from: left, over: right });
        engine.hover_leave();
        assert_eq!(engine.phase(), DragPhase::Dragging { from: left });
    }

    #[tokio::test]
    async fn test_observer_cannot_start_a_drag() {
        let (store, left, _) = seeded_store();
        let mut engine = engine(&store, SessionRole::Observer);

        assert!(matches!(engine.begin(left), Err(Error::ReadOnly)));
        assert_eq!(engine.phase(), DragPhase::Idle);
    }
}
