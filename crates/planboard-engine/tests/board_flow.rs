//! End-to-end board editing flows over the in-memory store.

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
use planboard_core::{
    BlockedStatus, Cell, CellCoord, CellFields, Error, Person, PersonDayStatus, PersonId,
    PlanStore, ProjectId, WeekStart,
};
use planboard_engine::{
    AlwaysConfirm, ClipboardEngine, ConflictResolver, DragMoveEngine, MutationClient, Session,
    SessionRole, WeekCopyEngine,
};
use planboard_store::MemoryPlanStore;

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap_or_default()
}

fn person(id: i64, name: &str) -> Person {
    Person {
        id: PersonId(id),
        full_name: name.to_owned(),
        firm: "Netcom".to_owned(),
        team: "Alpha".to_owned(),
        skill_level: "senior".to_owned(),
    }
}

/// Everything a host would wire up for one editing session.
struct Board {
    store: MemoryPlanStore,
    session: Session,
    mutation: MutationClient,
    clipboard: ClipboardEngine,
}

impl Board {
    fn new(store: MemoryPlanStore) -> Self {
        let session = Session::new(SessionRole::Editor, WeekStart::containing(june(10)))
            .with_people(vec![person(5, "Kerem Oz"), person(3, "Elif Demir")]);
        let shared: Arc<dyn PlanStore> = Arc::new(store.clone());
        let resolver = ConflictResolver::new(Arc::clone(&shared), session.clone());
        let mutation = MutationClient::new(
            Arc::clone(&shared),
            session.clone(),
            resolver,
            Arc::new(AlwaysConfirm),
        );
        let clipboard = ClipboardEngine::new(shared, session.clone(), mutation.clone());
        Self {
            store,
            session,
            mutation,
            clipboard,
        }
    }

    fn drag(&self) -> DragMoveEngine {
        DragMoveEngine::new(Arc::new(self.store.clone()), self.session.clone())
    }

    fn weekcopy(&self) -> WeekCopyEngine {
        WeekCopyEngine::new(Arc::new(self.store.clone()), self.session.clone())
    }
}

#[tokio::test]
async fn test_editor_flow_save_is_blocked_by_leave() {
    let store = MemoryPlanStore::new()
        .with_person(person(5, "Kerem Oz"))
        .with_status(PersonId(5), june(10), PersonDayStatus::Leave);
    let board = Board::new(store);
    let coord = CellCoord::new(ProjectId(7), june(10));

    board.session.open_editor(coord);
    assert_eq!(board.session.toggle_person(PersonId(5)), Some(true));
    let Some(selection) = board.session.selection() else {
        panic!("the edit surface is open");
    };

    let fields = CellFields::new().with_shift("08:30-18:00");
    let refused = board
        .mutation
        .save(coord, &fields, &selection.person_ids, true)
        .await;
    let Err(Error::Blocked(entries)) = refused else {
        panic!("a person on leave must block the save even with the override");
    };
    assert_eq!(entries[0].status, BlockedStatus::Leave);
    assert_eq!(entries[0].full_name, "Kerem Oz");

    assert!(board.session.with_grid(|grid| grid.cell(coord).is_none()));
    assert!(board.store.stored_cell(coord).is_none());

    // Dropping the person unblocks the same submission.
    board.session.toggle_person(PersonId(5));
    let saved = board.mutation.save(coord, &fields, &[], false).await;
    assert!(saved.is_ok());
    assert!(board.store.stored_cell(coord).is_some());
}

#[tokio::test]
async fn test_busy_elsewhere_requires_explicit_override() {
    let store = MemoryPlanStore::new()
        .with_person(person(5, "Kerem Oz"))
        .with_project(ProjectId(9), "NE-204")
        .with_cell(
            CellCoord::new(ProjectId(9), june(10)),
            Cell {
                person_ids: vec![PersonId(5)],
                ..Cell::default()
            },
        );
    let board = Board::new(store);
    let coord = CellCoord::new(ProjectId(7), june(10));
    let fields = CellFields::new().with_shift("08:30-18:00");

    let refused = board.mutation.save(coord, &fields, &[PersonId(5)], false).await;
    let Err(Error::Blocked(entries)) = refused else {
        panic!("double-booking must need an explicit override");
    };
    assert_eq!(
        entries[0].status,
        BlockedStatus::BusyElsewhere {
            project_code: "NE-204".to_owned()
        }
    );

    board.session.refresh_availability();
    let overridden = board.mutation.save(coord, &fields, &[PersonId(5)], true).await;
    assert!(overridden.is_ok());
}

#[tokio::test]
async fn test_paste_overwrites_fields_but_not_attachments() {
    let source = CellCoord::new(ProjectId(7), june(10));
    let target = CellCoord::new(ProjectId(7), june(12));
    let store = MemoryPlanStore::new().with_person(person(3, "Elif Demir")).with_cell(
        target,
        Cell {
            note: "stale plan".to_owned(),
            lld_files: vec!["site-survey.pdf".to_owned()],
            tutanak_files: vec!["acceptance.pdf".to_owned()],
            ..Cell::default()
        },
    );
    let board = Board::new(store);

    let fields = CellFields::new()
        .with_shift("08:30-18:00")
        .with_note("fresh plan")
        .with_vehicle("34ABC123 Transit");
    let seeded = board.mutation.save(source, &fields, &[PersonId(3)], false).await;
    assert!(seeded.is_ok());

    assert!(board.clipboard.copy(source).await.is_ok());
    assert!(board.clipboard.paste_one(target).await.is_ok());

    let Some(pasted) = board.store.stored_cell(target) else {
        panic!("the paste wrote the target");
    };
    assert_eq!(pasted.note, "fresh plan");
    assert_eq!(pasted.person_ids, vec![PersonId(3)]);
    assert_eq!(pasted.lld_files, vec!["site-survey.pdf".to_owned()]);
    assert_eq!(pasted.tutanak_files, vec!["acceptance.pdf".to_owned()]);

    let plate = board
        .session
        .with_grid(|grid| grid.vehicle_summary(ProjectId(7)).map(ToOwned::to_owned));
    assert_eq!(plate.as_deref(), Some("34ABC123"));
}

#[tokio::test]
async fn test_drag_swap_exchanges_whole_cells() {
    let left = CellCoord::new(ProjectId(7), june(10));
    let right = CellCoord::new(ProjectId(9), june(10));
    let store = MemoryPlanStore::new()
        .with_cell(
            left,
            Cell {
                shift: "08:30-18:00".to_owned(),
                person_ids: vec![PersonId(5)],
                lld_files: vec!["north-lld.pdf".to_owned()],
                ..Cell::default()
            },
        )
        .with_cell(
            right,
            Cell {
                shift: "10:00-20:00".to_owned(),
                person_ids: vec![PersonId(3)],
                ..Cell::default()
            },
        );
    let board = Board::new(store);
    let mut drag = board.drag();

    assert!(drag.begin(left).is_ok());
    drag.hover_enter(right);
    assert!(drag.commit().await.is_ok());

    let Some(moved) = board.store.stored_cell(right) else {
        panic!("the swap wrote the target");
    };
    assert_eq!(moved.person_ids, vec![PersonId(5)]);
    assert_eq!(moved.lld_files, vec!["north-lld.pdf".to_owned()]);
    assert!(board
        .store
        .stored_cell(left)
        .is_some_and(|cell| cell.person_ids == vec![PersonId(3)]));
}

#[tokio::test]
async fn test_double_swap_restores_both_cells() {
    let left = CellCoord::new(ProjectId(7), june(10));
    let right = CellCoord::new(ProjectId(9), june(10));
    let store = MemoryPlanStore::new()
        .with_cell(
            left,
            Cell {
                shift: "08:30-18:00".to_owned(),
                person_ids: vec![PersonId(5)],
                lld_files: vec!["north-lld.pdf".to_owned()],
                ..Cell::default()
            },
        )
        .with_cell(
            right,
            Cell {
                shift: "10:00-20:00".to_owned(),
                person_ids: vec![PersonId(3)],
                tutanak_files: vec!["acceptance.pdf".to_owned()],
                ..Cell::default()
            },
        );
    let board = Board::new(store);
    let before_left = board.store.stored_cell(left);
    let before_right = board.store.stored_cell(right);

    let mut drag = board.drag();
    assert!(drag.begin(left).is_ok());
    drag.hover_enter(right);
    assert!(drag.commit().await.is_ok());

    assert!(drag.begin(left).is_ok());
    drag.hover_enter(right);
    assert!(drag.commit().await.is_ok());

    assert_eq!(board.store.stored_cell(left), before_left);
    assert_eq!(board.store.stored_cell(right), before_right);
    assert!(board.session.with_grid(|grid| {
        grid.cell(left) == before_left.as_ref() && grid.cell(right) == before_right.as_ref()
    }));
}

#[tokio::test]
async fn test_repeating_a_save_changes_nothing() {
    let store = MemoryPlanStore::new().with_person(person(5, "Kerem Oz"));
    let board = Board::new(store);
    let coord = CellCoord::new(ProjectId(7), june(10));
    let fields = CellFields::new()
        .with_shift("08:30-18:00")
        .with_vehicle("34ABC123 Transit");

    let first = board.mutation.save(coord, &fields, &[PersonId(5)], false).await;
    assert!(first.is_ok());
    let after_first = board.store.stored_cell(coord);
    let token_first = board.session.last_sync_token();

    let second = board.mutation.save(coord, &fields, &[PersonId(5)], false).await;
    assert!(second.is_ok(), "resubmitting the same cell is not a conflict");
    let after_second = board.store.stored_cell(coord);

    assert_eq!(after_second, after_first);
    assert!(board
        .session
        .with_grid(|grid| grid.cell(coord) == after_second.as_ref()));

    // Each save refreshes the session token past its own write.
    let token_second = board.session.last_sync_token();
    assert!(token_second >= token_first);
    assert_eq!(
        token_second,
        board.store.sync_token(board.session.week()).await.ok().flatten()
    );
}

#[tokio::test]
async fn test_week_duplication_round_trip() {
    let monday = CellCoord::new(ProjectId(7), june(10));
    let store = MemoryPlanStore::new().with_cell(
        monday,
        Cell {
            shift: "08:30-18:00".to_owned(),
            vehicle_info: "34ABC123 Transit".to_owned(),
            ..Cell::default()
        },
    );
    let board = Board::new(store);
    let weekcopy = board.weekcopy();

    let filled = weekcopy.duplicate_monday(ProjectId(7)).await;
    assert!(filled.is_ok_and(|summary| summary.copied == 6));

    let pushed = weekcopy.push_to_next_week().await;
    assert!(pushed.is_ok_and(|summary| summary.copied == 7));
    assert!(board
        .store
        .stored_cell(CellCoord::new(ProjectId(7), june(19)))
        .is_some_and(|cell| cell.shift == "08:30-18:00"));
}
