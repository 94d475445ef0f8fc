//! Session-scoped shared state.
//!
//! One `Session` lives for one viewed week and is reset on week change. It
//! replaces the legacy frontend's module-level globals with an explicit
//! context object handed to every engine: role, grid, clipboard, paint
//! flags, the availability cache, the last observed sync token, and the
//! people preferences.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use planboard_core::{
    CellCoord, ClipboardPayload, Error, Person, PersonId, RecoverLock as _, Result, SyncToken,
    WeekStart,
};
use tracing::debug;

use crate::availability::AvailabilityCache;
use crate::grid::{GridState, SelectionState};
use crate::prefs::PeoplePrefs;

/// Capability of the session holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// May mutate the board.
    Editor,
    /// View only; every mutating command is rejected.
    Observer,
}

/// State of the paint-paste gesture.
#[derive(Debug, Default)]
struct PaintState {
    /// Whether paint-paste mode is toggled on.
    mode: bool,
    /// Whether the pointer is held down during a paint gesture.
    pointer_down: bool,
    /// Last cell painted within the current gesture.
    last_painted: Option<CellCoord>,
}

/// Session state behind one lock, excluding the grid and the cache.
struct SessionInner {
    /// Capability of this session.
    role: SessionRole,
    /// Week this session views.
    week: WeekStart,
    /// Immutable people reference data.
    people: HashMap<PersonId, Person>,
    /// Copied cell template, if any.
    clipboard: Option<ClipboardPayload>,
    /// Paint-paste gesture state.
    paint: PaintState,
    /// Whether a first token observation happened.
    sync_baselined: bool,
    /// Last observed sync token for the week.
    last_token: Option<SyncToken>,
    /// Whether a reconciliation pass is in flight.
    reconciling: bool,
    /// Whether a mutation command is in flight.
    mutating: bool,
    /// Favorite and recently used people.
    prefs: PeoplePrefs,
}

/// Cloneable handle to the session state shared by all engines.
#[derive(Clone)]
pub struct Session {
    /// Flags, clipboard, token, preferences.
    inner: Arc<Mutex<SessionInner>>,
    /// The week grid.
    grid: Arc<Mutex<GridState>>,
    /// Memoized conflict lookups.
    cache: Arc<Mutex<AvailabilityCache>>,
}

/// Marks a reconciliation pass; dropping it releases the flag.
pub struct ReconcileGuard {
    /// Session whose flag is held.
    session: Session,
}

impl Drop for ReconcileGuard {
    fn drop(&mut self) {
        self.session.inner.lock_recover().reconciling = false;
    }
}

/// Marks a mutation in flight; dropping it releases the flag.
pub struct MutationGuard {
    /// Session whose flag is held.
    session: Session,
}

impl Drop for MutationGuard {
    fn drop(&mut self) {
        self.session.inner.lock_recover().mutating = false;
    }
}

impl Session {
    /// Creates a session for one viewed week.
    pub fn new(role: SessionRole, week: WeekStart) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                role,
                week,
                people: HashMap::new(),
                clipboard: None,
                paint: PaintState::default(),
                sync_baselined: false,
                last_token: None,
                reconciling: false,
                mutating: false,
                prefs: PeoplePrefs::default(),
            })),
            grid: Arc::new(Mutex::new(GridState::new(week))),
            cache: Arc::new(Mutex::new(AvailabilityCache::new())),
        }
    }

    /// Installs the immutable people reference data.
    #[must_use]
    pub fn with_people(self, people: Vec<Person>) -> Self {
        {
            let mut inner = self.inner.lock_recover();
            inner.people = people.into_iter().map(|person| (person.id, person)).collect();
        }
        self
    }

    /// Capability of this session.
    pub fn role(&self) -> SessionRole {
        self.inner.lock_recover().role
    }

    /// Week this session views.
    pub fn week(&self) -> WeekStart {
        self.inner.lock_recover().week
    }

    /// Rejects mutating commands for observer sessions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] when the session may not mutate.
    pub fn ensure_editable(&self) -> Result<()> {
        match self.role() {
            SessionRole::Editor => Ok(()),
            SessionRole::Observer => Err(Error::ReadOnly),
        }
    }

    /// Display name of a person, falling back to the raw id.
    pub fn person_name(&self, person: PersonId) -> String {
        self.inner
            .lock_recover()
            .people
            .get(&person)
            .map_or_else(|| person.to_string(), |entry| entry.full_name.clone())
    }

    /// Runs a closure against the locked grid.
    ///
    /// The lock is released when the closure returns; never call back into
    /// the session from inside it.
    pub fn with_grid<R>(&self, func: impl FnOnce(&mut GridState) -> R) -> R {
        func(&mut self.grid.lock_recover())
    }

    /// Runs a closure against the locked availability cache.
    pub fn with_cache<R>(&self, func: impl FnOnce(&mut AvailabilityCache) -> R) -> R {
        func(&mut self.cache.lock_recover())
    }

    /// Opens the edit surface on a coordinate.
    ///
    /// Reopening on a different coordinate invalidates the availability
    /// cache in full.
    pub fn open_editor(&self, coord: CellCoord) {
        let previous = {
            let mut grid = self.grid.lock_recover();
            let previous = grid.selection().map(|selection| selection.coord);
            grid.open_selection(coord);
            previous
        };
        if previous != Some(coord) {
            self.with_cache(AvailabilityCache::invalidate);
            debug!(%coord, "edit surface opened; availability cache invalidated");
        }
    }

    /// Closes the edit surface, discarding unsaved edits.
    pub fn close_editor(&self) {
        self.with_grid(GridState::close_selection);
    }

    /// Returns `true` while an edit surface is open.
    pub fn editor_open(&self) -> bool {
        self.grid.lock_recover().selection().is_some()
    }

    /// The active selection, if the edit surface is open.
    pub fn selection(&self) -> Option<SelectionState> {
        self.grid.lock_recover().selection().cloned()
    }

    /// Toggles one person in the open selection.
    ///
    /// Any selection change invalidates the availability cache.
    pub fn toggle_person(&self, person: PersonId) -> Option<bool> {
        let toggled = self.grid.lock_recover().toggle_person(person);
        if toggled.is_some() {
            self.with_cache(AvailabilityCache::invalidate);
        }
        toggled
    }

    /// Explicitly drops every memoized availability lookup.
    pub fn refresh_availability(&self) {
        self.with_cache(AvailabilityCache::invalidate);
    }

    /// The held clipboard payload, if any.
    pub fn clipboard(&self) -> Option<ClipboardPayload> {
        self.inner.lock_recover().clipboard.clone()
    }

    /// Replaces the clipboard payload.
    pub fn set_clipboard(&self, payload: Option<ClipboardPayload>) {
        self.inner.lock_recover().clipboard = payload;
    }

    /// Whether paint-paste mode is on.
    pub fn paint_mode(&self) -> bool {
        self.inner.lock_recover().paint.mode
    }

    /// Toggles paint-paste mode; disabling forgets the gesture state.
    pub fn set_paint_mode(&self, enabled: bool) {
        let mut inner = self.inner.lock_recover();
        if enabled {
            inner.paint.mode = true;
        } else {
            inner.paint = PaintState::default();
        }
    }

    /// Records that the pointer went down, starting a paint gesture.
    pub fn pointer_pressed(&self) {
        self.inner.lock_recover().paint.pointer_down = true;
    }

    /// Records that the pointer was released, ending the paint gesture.
    pub fn pointer_released(&self) {
        let mut inner = self.inner.lock_recover();
        inner.paint.pointer_down = false;
        inner.paint.last_painted = None;
    }

    /// Returns `true` while a paint gesture can deposit pastes.
    pub fn paint_ready(&self) -> bool {
        let inner = self.inner.lock_recover();
        inner.paint.mode && inner.paint.pointer_down
    }

    /// Marks a cell as painted within the current gesture.
    ///
    /// Returns `false` when the cell was the one painted last, so
    /// re-entering it without leaving issues no second paste.
    pub fn try_mark_painted(&self, coord: CellCoord) -> bool {
        let mut inner = self.inner.lock_recover();
        if inner.paint.last_painted == Some(coord) {
            return false;
        }
        inner.paint.last_painted = Some(coord);
        true
    }

    /// Whether a first sync-token observation happened.
    pub fn has_sync_baseline(&self) -> bool {
        self.inner.lock_recover().sync_baselined
    }

    /// Last observed sync token for the week.
    pub fn last_sync_token(&self) -> Option<SyncToken> {
        self.inner.lock_recover().last_token
    }

    /// Stores an observed sync token and marks the baseline as taken.
    pub fn set_sync_token(&self, token: Option<SyncToken>) {
        let mut inner = self.inner.lock_recover();
        inner.sync_baselined = true;
        inner.last_token = token;
    }

    /// Claims the reconciliation flag.
    ///
    /// Returns `None` while another pass or a mutation is in flight.
    pub fn try_begin_reconcile(&self) -> Option<ReconcileGuard> {
        let mut inner = self.inner.lock_recover();
        if inner.reconciling || inner.mutating {
            return None;
        }
        inner.reconciling = true;
        drop(inner);
        Some(ReconcileGuard {
            session: self.clone(),
        })
    }

    /// Marks a mutation command as in flight.
    pub fn begin_mutation(&self) -> MutationGuard {
        self.inner.lock_recover().mutating = true;
        MutationGuard {
            session: self.clone(),
        }
    }

    /// Toggles a favorite person; returns whether they are now favorite.
    pub fn toggle_favorite(&self, person: PersonId) -> bool {
        self.inner.lock_recover().prefs.toggle_favorite(person)
    }

    /// Favorite people, sorted by id.
    pub fn favorites(&self) -> Vec<PersonId> {
        self.inner.lock_recover().prefs.favorites()
    }

    /// Records people as recently used, most recent first.
    pub fn record_recent_people(&self, person_ids: &[PersonId]) {
        let mut inner = self.inner.lock_recover();
        for person in person_ids {
            inner.prefs.record_recent(*person);
        }
    }

    /// Recently used people, most recent first.
    pub fn recent_people(&self) -> Vec<PersonId> {
        self.inner.lock_recover().prefs.recent().to_vec()
    }

    /// Loads persisted preferences, replacing the in-memory ones.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_prefs(&self, path: &Path) -> Result<()> {
        let prefs = PeoplePrefs::load(path)?;
        self.inner.lock_recover().prefs = prefs;
        Ok(())
    }

    /// Persists the current preferences.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn save_prefs(&self, path: &Path) -> Result<()> {
        let prefs = self.inner.lock_recover().prefs.clone();
        prefs.save(path)
    }
}
