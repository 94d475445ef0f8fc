//! In-memory plan store with the backend's semantics.
//!
//! Reproduces implicit cell creation, hard status blocking, the soft
//! same-team conflict, snapshot-based moves and week copies, and the
//! per-week staleness token. Every call is recorded so tests can assert on
//! interaction counts, not just final state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use planboard_core::{
    AssignedPerson, BlockedEntry, BlockedStatus, Cell, CellCoord, CellFields, CopySummary, Error,
    MoveMode, Person, PersonDayStatus, PersonId, PlanStore, ProjectId, RecoverLock as _, Result,
    SaveOutcome, SyncToken, WeekData, WeekStart,
};

/// Mutable store contents behind one lock.
#[derive(Debug, Default)]
struct StoreState {
    /// Saved cells. Absence means the cell was never written.
    cells: HashMap<CellCoord, Cell>,
    /// People reference data.
    people: HashMap<PersonId, Person>,
    /// Project codes for conflict reporting.
    projects: HashMap<ProjectId, String>,
    /// Explicit day statuses.
    statuses: HashMap<(PersonId, NaiveDate), PersonDayStatus>,
    /// Staleness token per week, bumped on every mutation.
    tokens: HashMap<WeekStart, SyncToken>,
    /// Monotonic source for tokens.
    clock: i64,
    /// Recorded operations, oldest first.
    calls: Vec<String>,
    /// Operation names that fail exactly once when next invoked.
    failures: Vec<String>,
}

impl StoreState {
    /// Records an operation and consumes a pending injected failure for it.
    fn enter(&mut self, operation: &str, detail: &str) -> Result<()> {
        self.calls.push(format!("{operation} {detail}"));
        if let Some(index) = self.failures.iter().position(|name| name == operation) {
            self.failures.remove(index);
            return Err(Error::Store(format!("injected {operation} failure")));
        }
        Ok(())
    }

    /// Advances the week token covering `date`.
    fn bump(&mut self, date: NaiveDate) {
        self.clock += 1;
        let week = WeekStart::containing(date);
        self.tokens.insert(week, SyncToken(self.clock));
    }

    fn person_name(&self, person: PersonId) -> String {
        self.people
            .get(&person)
            .map_or_else(|| person.to_string(), |entry| entry.full_name.clone())
    }

    fn project_code(&self, project: ProjectId) -> String {
        self.projects
            .get(&project)
            .map_or_else(|| format!("PRJ-{project}"), Clone::clone)
    }
}

/// In-memory [`PlanStore`] used as the test substrate.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlanStore {
    /// Shared store contents.
    state: Arc<Mutex<StoreState>>,
}

impl MemoryPlanStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a person to the reference data.
    #[must_use]
    pub fn with_person(self, person: Person) -> Self {
        self.state.lock_recover().people.insert(person.id, person);
        self
    }

    /// Registers a project code used in conflict reports.
    #[must_use]
    pub fn with_project(self, project: ProjectId, code: impl Into<String>) -> Self {
        self.state.lock_recover().projects.insert(project, code.into());
        self
    }

    /// Seeds an explicit day status.
    #[must_use]
    pub fn with_status(self, person: PersonId, date: NaiveDate, status: PersonDayStatus) -> Self {
        self.state.lock_recover().statuses.insert((person, date), status);
        self
    }

    /// Seeds a saved cell without bumping the week token.
    #[must_use]
    pub fn with_cell(self, coord: CellCoord, cell: Cell) -> Self {
        self.state.lock_recover().cells.insert(coord, cell);
        self
    }

    /// Changes a day status at runtime, as a concurrent session would.
    pub fn set_status(&self, person: PersonId, date: NaiveDate, status: PersonDayStatus) {
        self.state.lock_recover().statuses.insert((person, date), status);
    }

    /// Makes the next invocation of `operation` fail with a store error.
    pub fn fail_once(&self, operation: impl Into<String>) {
        self.state.lock_recover().failures.push(operation.into());
    }

    /// Reads a cell directly, bypassing the trait, for assertions.
    pub fn stored_cell(&self, coord: CellCoord) -> Option<Cell> {
        self.state.lock_recover().cells.get(&coord).cloned()
    }

    /// Returns the recorded operations, oldest first.
    pub fn call_history(&self) -> Vec<String> {
        self.state.lock_recover().calls.clone()
    }

    /// Counts recorded invocations of one operation.
    pub fn call_count(&self, operation: &str) -> usize {
        self.state
            .lock_recover()
            .calls
            .iter()
            .filter(|entry| {
                entry
                    .split_whitespace()
                    .next()
                    .is_some_and(|name| name == operation)
            })
            .count()
    }
}

/// Normalizes a person set for the exact-team comparison.
fn team_signature(person_ids: &[PersonId]) -> Vec<PersonId> {
    let mut signature: Vec<PersonId> = person_ids.to_vec();
    signature.sort_unstable();
    signature.dedup();
    signature
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn get_cell(&self, coord: CellCoord) -> Result<Option<Cell>> {
        let mut state = self.state.lock_recover();
        state.enter("get_cell", &coord.to_string())?;
        Ok(state.cells.get(&coord).cloned())
    }

    async fn save_cell(
        &self,
        coord: CellCoord,
        fields: &CellFields,
        person_ids: &[PersonId],
        override_conflicts: bool,
    ) -> Result<SaveOutcome> {
        let mut state = self.state.lock_recover();
        state.enter("save_cell", &coord.to_string())?;

        // Hard statuses reject regardless of the override flag.
        let mut blocked = Vec::new();
        for pid in person_ids {
            if let Some(status) = state.statuses.get(&(*pid, coord.date)).copied() {
                if let Some(reason) = BlockedStatus::from_day_status(status) {
                    blocked.push(BlockedEntry {
                        person: *pid,
                        full_name: state.person_name(*pid),
                        status: reason,
                    });
                }
            }
        }
        if !blocked.is_empty() {
            return Err(Error::Blocked(blocked));
        }

        // Soft conflict: the exact same team on another project that day.
        if !person_ids.is_empty() && !override_conflicts {
            let proposed = team_signature(person_ids);
            let clash = state
                .cells
                .iter()
                .find(|(other, cell)| {
                    other.date == coord.date
                        && other.project != coord.project
                        && team_signature(&cell.person_ids) == proposed
                })
                .map(|(other, _)| other.project);
            if let Some(project) = clash {
                let code = state.project_code(project);
                return Err(Error::Store(format!(
                    "team already working on project {code} that day"
                )));
            }
        }

        let cell = state.cells.entry(coord).or_default();
        cell.apply_fields(fields);
        cell.set_people(person_ids);
        let team_name = cell.team_name.clone();
        state.bump(coord.date);
        Ok(SaveOutcome { team_name })
    }

    async fn clear_cell(&self, coord: CellCoord) -> Result<()> {
        let mut state = self.state.lock_recover();
        state.enter("clear_cell", &coord.to_string())?;
        state.cells.insert(coord, Cell::default());
        state.bump(coord.date);
        Ok(())
    }

    async fn move_cell(&self, from: CellCoord, to: CellCoord, mode: MoveMode) -> Result<()> {
        let mut state = self.state.lock_recover();
        state.enter("move_cell", &format!("{from} -> {to}"))?;
        if from == to {
            return Ok(());
        }
        let source = state.cells.get(&from).cloned().unwrap_or_default();
        let target = state.cells.get(&to).cloned().unwrap_or_default();
        match mode {
            MoveMode::Swap => {
                state.cells.insert(to, source);
                state.cells.insert(from, target);
            }
            MoveMode::Move => {
                state.cells.insert(to, source);
                state.cells.insert(from, Cell::default());
            }
        }
        state.bump(from.date);
        state.bump(to.date);
        Ok(())
    }

    async fn copy_day_to_week(&self, project: ProjectId, week: WeekStart) -> Result<CopySummary> {
        let mut state = self.state.lock_recover();
        state.enter("copy_day_to_week", &format!("{project} {week}"))?;
        let source = state
            .cells
            .get(&CellCoord::new(project, week.day(0)))
            .cloned()
            .unwrap_or_default();
        for offset in 1..7 {
            state
                .cells
                .insert(CellCoord::new(project, week.day(offset)), source.clone());
        }
        state.bump(week.day(0));
        Ok(CopySummary {
            copied: 6,
            blocked: Vec::new(),
        })
    }

    async fn copy_week_to_next(&self, week: WeekStart) -> Result<CopySummary> {
        let mut state = self.state.lock_recover();
        state.enter("copy_week_to_next", &week.to_string())?;
        let sources: Vec<(CellCoord, Cell)> = state
            .cells
            .iter()
            .filter(|(coord, _)| week.contains(coord.date))
            .map(|(coord, cell)| (*coord, cell.clone()))
            .collect();
        let next = week.next();
        let mut copied = 0;
        for (coord, cell) in sources {
            let offset = (coord.date - week.monday()).num_days().unsigned_abs();
            state
                .cells
                .insert(CellCoord::new(coord.project, next.day(offset)), cell);
            copied += 1;
        }
        state.bump(next.day(0));
        Ok(CopySummary {
            copied,
            blocked: Vec::new(),
        })
    }

    async fn copy_week_from_previous(&self, week: WeekStart) -> Result<CopySummary> {
        let mut state = self.state.lock_recover();
        state.enter("copy_week_from_previous", &week.to_string())?;
        let previous = week.previous();
        let sources: Vec<(CellCoord, Cell)> = state
            .cells
            .iter()
            .filter(|(coord, _)| previous.contains(coord.date))
            .map(|(coord, cell)| (*coord, cell.clone()))
            .collect();
        if sources.is_empty() {
            return Err(Error::Store(
                "previous week holds nothing to copy".to_owned(),
            ));
        }
        let mut copied = 0;
        for (coord, cell) in sources {
            let offset = (coord.date - previous.monday()).num_days().unsigned_abs();
            state
                .cells
                .insert(CellCoord::new(coord.project, week.day(offset)), cell);
            copied += 1;
        }
        state.bump(week.day(0));
        Ok(CopySummary {
            copied,
            blocked: Vec::new(),
        })
    }

    async fn assigned_elsewhere(
        &self,
        date: NaiveDate,
        reference: ProjectId,
    ) -> Result<Vec<AssignedPerson>> {
        let mut state = self.state.lock_recover();
        state.enter("assigned_elsewhere", &format!("{date} ref {reference}"))?;
        let mut seen: HashMap<PersonId, ProjectId> = HashMap::new();
        for (coord, cell) in &state.cells {
            if coord.date != date || coord.project == reference {
                continue;
            }
            for pid in &cell.person_ids {
                seen.entry(*pid).or_insert(coord.project);
            }
        }
        let mut assigned: Vec<AssignedPerson> = seen
            .into_iter()
            .map(|(person, project)| AssignedPerson {
                person,
                full_name: state.person_name(person),
                project_code: state.project_code(project),
            })
            .collect();
        assigned.sort_by_key(|entry| entry.person);
        Ok(assigned)
    }

    async fn person_statuses(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<PersonId, PersonDayStatus>> {
        let mut state = self.state.lock_recover();
        state.enter("person_statuses", &date.to_string())?;
        Ok(state
            .statuses
            .iter()
            .filter(|((_, status_date), _)| *status_date == date)
            .map(|((person, _), status)| (*person, *status))
            .collect())
    }

    async fn sync_token(&self, week: WeekStart) -> Result<Option<SyncToken>> {
        let mut state = self.state.lock_recover();
        state.enter("sync_token", &week.to_string())?;
        Ok(state.tokens.get(&week).copied())
    }

    async fn week_cells(&self, week: WeekStart) -> Result<WeekData> {
        let mut state = self.state.lock_recover();
        state.enter("week_cells", &week.to_string())?;
        Ok(WeekData {
            cells: state
                .cells
                .iter()
                .filter(|(coord, _)| week.contains(coord.date))
                .map(|(coord, cell)| (*coord, cell.clone()))
                .collect(),
        })
    }
}
