//! In-memory representation of the displayed week.
//!
//! `GridState` is the shared substrate every engine reads and writes. It
//! never talks to the network: mutation here happens only after a remote
//! write was confirmed, plus the transient drag affordance. Each change
//! bumps a revision and fires the render hook.

use std::collections::HashMap;

use planboard_core::{Cell, CellCoord, CellFields, PersonId, ProjectId, WeekData, WeekStart};

/// Callback invoked after every grid change.
pub type RenderHook = Box<dyn Fn() + Send>;

/// The active cell being edited and the people selected for it.
///
/// Exists only while the edit surface is open; closing it discards the
/// selection with no cancel semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    /// Coordinate the edit surface is open on.
    pub coord: CellCoord,
    /// Selected people in selection order.
    pub person_ids: Vec<PersonId>,
}

/// Cells and selection for one displayed week.
pub struct GridState {
    /// Week the grid covers.
    week: WeekStart,
    /// Cells keyed by coordinate; absent coordinates are empty.
    cells: HashMap<CellCoord, Cell>,
    /// Active edit-surface selection, if any.
    selection: Option<SelectionState>,
    /// First vehicle plate per project row, derived from the week's cells.
    vehicle_summary: HashMap<ProjectId, String>,
    /// Source cell of an in-flight drag gesture (visual affordance only).
    drag_source: Option<CellCoord>,
    /// Monotonic change counter.
    revision: u64,
    /// Render trigger fired on every change.
    render_hook: Option<RenderHook>,
}

impl GridState {
    /// Creates an empty grid for one week.
    pub fn new(week: WeekStart) -> Self {
        Self {
            week,
            cells: HashMap::new(),
            selection: None,
            vehicle_summary: HashMap::new(),
            drag_source: None,
            revision: 0,
            render_hook: None,
        }
    }

    /// Week the grid covers.
    pub fn week(&self) -> WeekStart {
        self.week
    }

    /// Installs the render trigger.
    pub fn set_render_hook(&mut self, hook: RenderHook) {
        self.render_hook = Some(hook);
    }

    /// Number of changes applied since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
        if let Some(hook) = &self.render_hook {
            hook();
        }
    }

    /// Reads one cell; `None` means empty.
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Mirrors a confirmed save into the local copy.
    ///
    /// Used strictly post-commit so unconfirmed writes never show as truth.
    pub fn apply_local_update(
        &mut self,
        coord: CellCoord,
        fields: &CellFields,
        person_ids: &[PersonId],
    ) {
        let cell = self.cells.entry(coord).or_default();
        cell.apply_fields(fields);
        cell.set_people(person_ids);
        self.touch();
    }

    /// Replaces one cell with an authoritative snapshot from the store.
    pub fn apply_cell(&mut self, coord: CellCoord, cell: Option<Cell>) {
        match cell {
            Some(cell) => {
                self.cells.insert(coord, cell);
            }
            None => {
                self.cells.remove(&coord);
            }
        }
        self.touch();
    }

    /// Sets the stored team name on an existing cell.
    pub fn set_cell_team_name(&mut self, coord: CellCoord, team_name: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.team_name = team_name.into();
            self.touch();
        }
    }

    /// Mirrors a confirmed clear: all fields reset, position preserved.
    pub fn clear_local(&mut self, coord: CellCoord) {
        self.cells.insert(coord, Cell::default());
        self.touch();
    }

    /// Discards every cell and installs a freshly fetched week.
    pub fn replace_all(&mut self, data: WeekData) {
        self.cells = data.cells;
        self.touch();
    }

    /// Opens the edit surface on a coordinate.
    ///
    /// The selection starts from the people already on the cell.
    pub fn open_selection(&mut self, coord: CellCoord) {
        let person_ids = self
            .cells
            .get(&coord)
            .map(|cell| cell.person_ids.clone())
            .unwrap_or_default();
        self.selection = Some(SelectionState { coord, person_ids });
        self.touch();
    }

    /// Closes the edit surface, losing unsaved edits.
    pub fn close_selection(&mut self) {
        if self.selection.take().is_some() {
            self.touch();
        }
    }

    /// The active selection, if the edit surface is open.
    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.as_ref()
    }

    /// Toggles one person in the open selection.
    ///
    /// Returns `None` when no edit surface is open, otherwise whether the
    /// person ended up selected.
    pub fn toggle_person(&mut self, person: PersonId) -> Option<bool> {
        let selection = self.selection.as_mut()?;
        let selected = if selection.person_ids.contains(&person) {
            selection.person_ids.retain(|pid| *pid != person);
            false
        } else {
            selection.person_ids.push(person);
            true
        };
        self.touch();
        Some(selected)
    }

    /// Updates the derived vehicle plate for a project row.
    pub fn set_vehicle_summary(&mut self, project: ProjectId, plate: Option<String>) {
        match plate {
            Some(plate) => {
                self.vehicle_summary.insert(project, plate);
            }
            None => {
                self.vehicle_summary.remove(&project);
            }
        }
        self.touch();
    }

    /// The derived vehicle plate for a project row.
    pub fn vehicle_summary(&self, project: ProjectId) -> Option<&str> {
        self.vehicle_summary.get(&project).map(String::as_str)
    }

    /// Project rows currently known to the grid, sorted.
    pub fn projects(&self) -> Vec<ProjectId> {
        let mut projects: Vec<ProjectId> = self
            .cells
            .keys()
            .map(|coord| coord.project)
            .chain(self.vehicle_summary.keys().copied())
            .collect();
        projects.sort_unstable();
        projects.dedup();
        projects
    }

    /// Re-derives the vehicle plate of one project row from its cells.
    ///
    /// The plate is the first whitespace-separated token of the first
    /// non-empty `vehicle_info` across the week, Monday first.
    pub fn recompute_vehicle(&mut self, project: ProjectId) {
        let plate = self.week.days().find_map(|date| {
            self.cells
                .get(&CellCoord::new(project, date))
                .and_then(|cell| cell.vehicle_info.split_whitespace().next())
                .map(ToOwned::to_owned)
        });
        self.set_vehicle_summary(project, plate);
    }

    /// Re-derives the vehicle plate of every known project row.
    pub fn recompute_all_vehicles(&mut self) {
        for project in self.projects() {
            self.recompute_vehicle(project);
        }
    }

    /// Marks or clears the drag-gesture source affordance.
    pub fn set_drag_source(&mut self, source: Option<CellCoord>) {
        self.drag_source = source;
        self.touch();
    }

    /// Source cell of the drag gesture in flight, if any.
    pub fn drag_source(&self) -> Option<CellCoord> {
        self.drag_source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap_or_default()
    }

    fn grid() -> GridState {
        GridState::new(WeekStart::containing(june(10)))
    }

    #[test]
    fn test_apply_then_clear_keeps_position() {
        let mut grid = grid();
        let coord = CellCoord::new(ProjectId(7), june(10));
        let fields = CellFields::new().with_shift("08:30-18:00");

        grid.apply_local_update(coord, &fields, &[PersonId(5)]);
        assert!(grid.cell(coord).is_some_and(|cell| !cell.is_empty()));

        grid.clear_local(coord);
        let cleared = grid.cell(coord);
        assert!(cleared.is_some(), "clear keeps the grid position");
        assert!(cleared.is_some_and(Cell::is_empty));
    }

    #[test]
    fn test_replace_all_discards_previous_cells() {
        let mut grid = grid();
        let stale = CellCoord::new(ProjectId(7), june(10));
        grid.apply_local_update(stale, &CellFields::new().with_note("old"), &[]);

        let fresh = CellCoord::new(ProjectId(9), june(11));
        let mut data = WeekData::default();
        data.cells.insert(
            fresh,
            Cell {
                shift: "10:00-20:00".to_owned(),
                ..Cell::default()
            },
        );
        grid.replace_all(data);

        assert!(grid.cell(stale).is_none());
        assert!(grid.cell(fresh).is_some());
    }

    #[test]
    fn test_selection_toggle_keeps_order() {
        let mut grid = grid();
        let coord = CellCoord::new(ProjectId(7), june(10));
        assert!(grid.toggle_person(PersonId(5)).is_none(), "surface closed");

        grid.open_selection(coord);
        assert_eq!(grid.toggle_person(PersonId(5)), Some(true));
        assert_eq!(grid.toggle_person(PersonId(3)), Some(true));
        assert_eq!(grid.toggle_person(PersonId(5)), Some(false));
        let selection = grid.selection().cloned();
        assert!(selection.is_some_and(|sel| sel.person_ids == vec![PersonId(3)]));

        grid.close_selection();
        assert!(grid.selection().is_none());
    }

    #[test]
    fn test_render_hook_fires_on_change() {
        let mut grid = grid();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        grid.set_render_hook(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let before = grid.revision();
        grid.set_vehicle_summary(ProjectId(7), Some("34ABC123".to_owned()));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(grid.revision() > before);
    }

    #[test]
    fn test_recompute_vehicle_takes_first_plate_token() {
        let mut grid = grid();
        let project = ProjectId(7);
        grid.apply_local_update(
            CellCoord::new(project, june(11)),
            &CellFields::new().with_vehicle("34ABC123 Transit"),
            &[],
        );
        grid.apply_local_update(
            CellCoord::new(project, june(12)),
            &CellFields::new().with_vehicle("06XYZ77 Doblo"),
            &[],
        );

        grid.recompute_vehicle(project);
        assert_eq!(grid.vehicle_summary(project), Some("34ABC123"));

        grid.apply_local_update(CellCoord::new(project, june(11)), &CellFields::new(), &[]);
        grid.apply_local_update(CellCoord::new(project, june(12)), &CellFields::new(), &[]);
        grid.recompute_vehicle(project);
        assert_eq!(grid.vehicle_summary(project), None, "no plate left in the row");
    }

    #[test]
    fn test_projects_union_cells_and_summaries() {
        let mut grid = grid();
        grid.apply_local_update(
            CellCoord::new(ProjectId(9), june(10)),
            &CellFields::new().with_shift("x"),
            &[],
        );
        grid.set_vehicle_summary(ProjectId(7), Some("34ABC123".to_owned()));
        assert_eq!(grid.projects(), vec![ProjectId(7), ProjectId(9)]);
    }
}
