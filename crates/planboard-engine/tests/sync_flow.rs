//! Staleness detection flows: polling, suppression, and own-write immunity.

#![cfg_attr(
    test,
    allow(
        clippy::tests_outside_test_module,
        clippy::missing_panics_doc,
        reason = "Test file allows"
    )
)]

use std::sync::Arc;

use chrono::NaiveDate;
use planboard_core::{CellCoord, CellFields, PersonId, PlanStore, ProjectId, WeekStart};
use planboard_engine::{
    AlwaysConfirm, ClipboardEngine, ConflictResolver, MutationClient, Session, SessionRole,
    SyncReconciler, TickOutcome,
};
use planboard_store::MemoryPlanStore;

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap_or_default()
}

struct SyncedBoard {
    store: MemoryPlanStore,
    session: Session,
    mutation: MutationClient,
    reconciler: SyncReconciler,
}

impl SyncedBoard {
    fn new(store: MemoryPlanStore) -> Self {
        let session = Session::new(SessionRole::Editor, WeekStart::containing(june(10)));
        let shared: Arc<dyn PlanStore> = Arc::new(store.clone());
        let resolver = ConflictResolver::new(Arc::clone(&shared), session.clone());
        let mutation = MutationClient::new(
            Arc::clone(&shared),
            session.clone(),
            resolver,
            Arc::new(AlwaysConfirm),
        );
        let reconciler = SyncReconciler::new(shared, session.clone());
        Self {
            store,
            session,
            mutation,
            reconciler,
        }
    }

    /// Writes a cell the way a different session would: straight to the
    /// store, bypassing this session's token refresh.
    async fn foreign_write(&self, coord: CellCoord, shift: &str) {
        let fields = CellFields::new().with_shift(shift);
        let written = self
            .store
            .save_cell(coord, &fields, &[PersonId(8)], false)
            .await;
        assert!(written.is_ok());
    }
}

#[tokio::test]
async fn test_own_write_never_reads_as_foreign() {
    let board = SyncedBoard::new(MemoryPlanStore::new());
    assert_eq!(board.reconciler.tick().await, TickOutcome::Baseline);

    let coord = CellCoord::new(ProjectId(7), june(10));
    let fields = CellFields::new().with_shift("08:30-18:00");
    let saved = board.mutation.save(coord, &fields, &[], false).await;
    assert!(saved.is_ok());

    assert_eq!(
        board.reconciler.tick().await,
        TickOutcome::Quiet,
        "the save refreshed the token, so no rebuild follows"
    );
    assert_eq!(board.store.call_count("week_cells"), 0);
}

#[tokio::test]
async fn test_foreign_write_rebuilds_cells_and_vehicles() {
    let board = SyncedBoard::new(MemoryPlanStore::new());
    assert_eq!(board.reconciler.tick().await, TickOutcome::Baseline);

    let coord = CellCoord::new(ProjectId(9), june(11));
    let fields = CellFields::new()
        .with_shift("10:00-20:00")
        .with_vehicle("06XYZ77 Doblo");
    let written = board.store.save_cell(coord, &fields, &[], false).await;
    assert!(written.is_ok());

    assert_eq!(board.reconciler.tick().await, TickOutcome::Rebuilt);
    assert!(board
        .session
        .with_grid(|grid| grid.cell(coord).is_some_and(|cell| cell.shift == "10:00-20:00")));
    let plate = board
        .session
        .with_grid(|grid| grid.vehicle_summary(ProjectId(9)).map(ToOwned::to_owned));
    assert_eq!(plate.as_deref(), Some("06XYZ77"));
}

#[tokio::test]
async fn test_open_editor_suppresses_rebuild_until_closed() {
    let board = SyncedBoard::new(MemoryPlanStore::new());
    assert_eq!(board.reconciler.tick().await, TickOutcome::Baseline);

    let edited = CellCoord::new(ProjectId(7), june(10));
    board.session.open_editor(edited);
    board
        .foreign_write(CellCoord::new(ProjectId(9), june(11)), "10:00-20:00")
        .await;

    assert_eq!(board.reconciler.tick().await, TickOutcome::Deferred);
    assert!(
        board
            .session
            .with_grid(|grid| grid.cell(CellCoord::new(ProjectId(9), june(11))).is_none()),
        "the grid is untouched while the edit surface is open"
    );

    board.session.close_editor();
    assert_eq!(board.reconciler.tick().await, TickOutcome::Rebuilt);
    assert!(board
        .session
        .with_grid(|grid| grid.cell(CellCoord::new(ProjectId(9), june(11))).is_some()));
}

#[tokio::test]
async fn test_stale_cell_appears_after_rebuild() {
    let board = SyncedBoard::new(MemoryPlanStore::new());
    let coord = CellCoord::new(ProjectId(7), june(10));

    let fields = CellFields::new().with_shift("08:30-18:00");
    let saved = board.mutation.save(coord, &fields, &[], false).await;
    assert!(saved.is_ok());
    assert_eq!(board.reconciler.tick().await, TickOutcome::Quiet);

    // Someone else rewrites the same cell.
    board.foreign_write(coord, "12:00-22:00").await;
    assert_eq!(board.reconciler.tick().await, TickOutcome::Rebuilt);
    assert!(board
        .session
        .with_grid(|grid| grid.cell(coord).is_some_and(|cell| cell.shift == "12:00-22:00")));
}

#[tokio::test]
async fn test_paint_run_stays_quiet_afterwards() {
    let board = SyncedBoard::new(MemoryPlanStore::new());
    let clipboard = ClipboardEngine::new(
        Arc::new(board.store.clone()),
        board.session.clone(),
        board.mutation.clone(),
    );
    assert_eq!(board.reconciler.tick().await, TickOutcome::Baseline);

    let source = CellCoord::new(ProjectId(7), june(10));
    let fields = CellFields::new().with_shift("08:30-18:00");
    let seeded = board.mutation.save(source, &fields, &[], false).await;
    assert!(seeded.is_ok());
    assert!(clipboard.copy(source).await.is_ok());

    clipboard.set_paint_mode(true);
    clipboard.pointer_pressed();
    for day in 11..=13 {
        let painted = clipboard
            .paint_enter(CellCoord::new(ProjectId(7), june(day)))
            .await;
        assert!(painted.is_ok_and(|done| done));
    }
    clipboard.pointer_released();

    assert_eq!(
        board.reconciler.tick().await,
        TickOutcome::Quiet,
        "every paint refreshed the token as an own write"
    );
    assert!(board
        .store
        .stored_cell(CellCoord::new(ProjectId(7), june(13)))
        .is_some_and(|cell| cell.shift == "08:30-18:00"));
}

#[tokio::test]
async fn test_observer_session_still_sees_foreign_changes() {
    let store = MemoryPlanStore::new();
    let session = Session::new(SessionRole::Observer, WeekStart::containing(june(10)));
    let reconciler = SyncReconciler::new(Arc::new(store.clone()), session.clone());
    assert_eq!(reconciler.tick().await, TickOutcome::Baseline);

    let coord = CellCoord::new(ProjectId(7), june(10));
    let written = store
        .save_cell(coord, &CellFields::new().with_shift("08:30-18:00"), &[], false)
        .await;
    assert!(written.is_ok());

    assert_eq!(reconciler.tick().await, TickOutcome::Rebuilt);
    assert!(session.with_grid(|grid| grid.cell(coord).is_some()));
}
