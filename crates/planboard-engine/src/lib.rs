//! Client-side editing and synchronization engine for the weekly
//! work-assignment board.
//!
//! The engine keeps a locally held week grid consistent with a shared
//! remote store while several sessions edit concurrently. Local state is
//! mirrored only after the store confirms a write; staleness caused by
//! other sessions is detected by polling a per-week token and resolved by
//! rebuilding the grid wholesale.

/// Memoized per-date conflict lookups.
pub mod availability;
/// Click-paste and paint-mode bulk paste.
pub mod clipboard;
/// Pre-commit personnel conflict policy.
pub mod conflict;
/// Pointer-drag move/swap of two cells.
pub mod drag;
/// In-memory week grid and selection.
pub mod grid;
/// Save and clear commands against the remote store.
pub mod mutation;
/// Persisted favorite and recently used people.
pub mod prefs;
/// Polling reconciliation against the remote store.
pub mod reconcile;
/// Session-scoped shared state and capabilities.
pub mod session;
/// Week-to-week duplication commands.
pub mod weekcopy;

pub use availability::{AvailabilityCache, DayConflicts};
pub use clipboard::ClipboardEngine;
pub use conflict::ConflictResolver;
pub use drag::{DragMoveEngine, DragPhase};
pub use grid::{GridState, SelectionState};
pub use mutation::{AlwaysConfirm, ConfirmGuard, MutationClient};
pub use prefs::PeoplePrefs;
pub use reconcile::{SyncReconciler, TickOutcome};
pub use session::{MutationGuard, ReconcileGuard, Session, SessionRole};
pub use weekcopy::WeekCopyEngine;
