//! Polling reconciliation against the remote store.
//!
//! Each tick compares the week's staleness token with the last one seen.
//! The first observation is a baseline and triggers nothing. A changed
//! token means another session mutated the week; the grid is then rebuilt
//! wholesale from the store. An open edit surface defers the whole pass:
//! the token stays unrecorded, so the change is re-detected and resolved
//! on a later tick. Own writes refresh the token at save time, so they
//! never read as foreign.

use std::sync::Arc;
use std::time::Duration;

use planboard_core::PlanStore;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::grid::GridState;
use crate::session::Session;

/// Default spacing between polls.
const DEFAULT_PERIOD: Duration = Duration::from_secs(3);

/// What a reconciliation tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another pass or a mutation was in flight, or the poll failed.
    Skipped,
    /// First token observation; nothing compared yet.
    Baseline,
    /// Token unchanged; only the row vehicle summaries were re-derived.
    Quiet,
    /// Foreign change detected and the grid rebuilt.
    Rebuilt,
    /// An edit surface is open; nothing was recorded, so any foreign
    /// change is picked up again once it closes.
    Deferred,
}

/// Periodic staleness detector for one session.
#[derive(Clone)]
pub struct SyncReconciler {
    /// Remote store polled for tokens and rebuilds.
    store: Arc<dyn PlanStore>,
    /// Session whose grid is kept current.
    session: Session,
    /// Spacing between polls.
    period: Duration,
}

impl SyncReconciler {
    /// Creates a reconciler with the default three-second period.
    pub fn new(store: Arc<dyn PlanStore>, session: Session) -> Self {
        Self {
            store,
            session,
            period: DEFAULT_PERIOD,
        }
    }

    /// Overrides the polling period.
    #[must_use]
    pub fn with_period(self, period: Duration) -> Self {
        Self { period, ..self }
    }

    /// Runs one reconciliation pass.
    ///
    /// Never returns an error: remote failures degrade to [`TickOutcome::Skipped`]
    /// and the next tick tries again.
    pub async fn tick(&self) -> TickOutcome {
        let Some(_pass) = self.session.try_begin_reconcile() else {
            return TickOutcome::Skipped;
        };
        if self.session.editor_open() {
            return TickOutcome::Deferred;
        }
        let week = self.session.week();

        let token = match self.store.sync_token(week).await {
            Ok(token) => token,
            Err(error) => {
                debug!(%error, "token poll failed");
                return TickOutcome::Skipped;
            }
        };

        if !self.session.has_sync_baseline() {
            self.session.set_sync_token(token);
            debug!(?token, "sync baseline taken");
            return TickOutcome::Baseline;
        }
        // Cheap and idempotent, so it runs on every compared tick.
        self.session
            .with_grid(GridState::recompute_all_vehicles);

        if token == self.session.last_sync_token() {
            return TickOutcome::Quiet;
        }

        // The edit surface may have opened while the token was in flight.
        // The token is recorded only after a successful rebuild, so a
        // deferred or failed pass re-detects the change next time.
        if self.session.editor_open() {
            debug!(?token, "foreign change seen; rebuild deferred behind open editor");
            return TickOutcome::Deferred;
        }

        match self.store.week_cells(week).await {
            Ok(data) => {
                self.session.with_grid(|grid| {
                    grid.replace_all(data);
                    grid.recompute_all_vehicles();
                });
                self.session.refresh_availability();
                self.session.set_sync_token(token);
                info!(%week, "grid rebuilt after foreign change");
                TickOutcome::Rebuilt
            }
            Err(error) => {
                warn!(%error, "week rebuild failed");
                TickOutcome::Skipped
            }
        }
    }

    /// Polls forever at the configured period.
    ///
    /// Late ticks are skipped rather than bursted, so a slow store never
    /// builds a backlog of polls.
    pub async fn run(&self) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }
}
