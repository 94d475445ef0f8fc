//! Core types and traits for the planboard engine.
//!
//! This crate defines the data model of the weekly work-assignment board,
//! the error taxonomy shared by every component, and the [`PlanStore`]
//! boundary behind which the remote store lives.

/// Error types and result definitions.
pub mod error;
/// Poison-recovering mutex helpers.
pub mod lock;
/// Trait definition for the remote plan store.
pub mod traits;
/// Core data types for cells, people, and conflicts.
pub mod types;
/// Monday-based calendar week helpers.
pub mod week;

pub use error::{Error, Result};
pub use lock::RecoverLock;
pub use traits::PlanStore;
pub use types::{
    AssignedPerson, BlockedEntry, BlockedStatus, Cell, CellCoord, CellFields, ClipboardPayload,
    CopySummary, MoveMode, Person, PersonDayStatus, PersonId, ProjectId, SaveOutcome, SyncToken,
    WeekData,
};
pub use week::WeekStart;
