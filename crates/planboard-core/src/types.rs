use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a project row on the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProjectId(pub i64);

/// Identifier of a person in the reference data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PersonId(pub i64);

impl Display for ProjectId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}", self.0)
    }
}

impl Display for PersonId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}", self.0)
    }
}

/// Address of one assignment cell: a project row on a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Project row the cell belongs to.
    pub project: ProjectId,
    /// Work date the cell covers.
    pub date: NaiveDate,
}

impl CellCoord {
    /// Creates a coordinate from a project id and a work date.
    pub fn new(project: ProjectId, date: NaiveDate) -> Self {
        Self { project, date }
    }
}

impl Display for CellCoord {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}@{}", self.project, self.date)
    }
}

/// One (project, date) assignment record.
///
/// Absent text fields are represented as empty strings, matching the wire
/// payloads. A cell with no shift, no note, and no people is considered
/// empty and is rendered distinctly from a populated one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Free-text time-range label, e.g. `08:30-18:00`.
    pub shift: String,
    /// Vehicle plate and description assigned for the day.
    pub vehicle_info: String,
    /// Free-text note.
    pub note: String,
    /// ISDP reference carried on the cell.
    pub isdp_info: String,
    /// Purchase-order reference carried on the cell.
    pub po_info: String,
    /// Highlighted note shown on the cell face.
    pub important_note: String,
    /// Display name of the assigned team.
    pub team_name: String,
    /// Mail-template body attached to the day's job.
    pub job_mail_body: String,
    /// Assigned people in selection order, duplicate free.
    pub person_ids: Vec<PersonId>,
    /// File names of uploaded LLD documents.
    pub lld_files: Vec<String>,
    /// File names of uploaded report documents.
    pub tutanak_files: Vec<String>,
}

impl Cell {
    /// Returns `true` when the cell holds no shift, no note, and no people.
    pub fn is_empty(&self) -> bool {
        self.shift.is_empty() && self.note.is_empty() && self.person_ids.is_empty()
    }

    /// Returns `true` when any attachment is present.
    pub fn has_attachments(&self) -> bool {
        !self.lld_files.is_empty() || !self.tutanak_files.is_empty()
    }

    /// Overwrites the writable fields from a save submission.
    ///
    /// Attachment lists only shrink here, via the removal lists carried on
    /// the submission; uploads happen outside this engine.
    pub fn apply_fields(&mut self, fields: &CellFields) {
        self.shift = fields.shift.clone();
        self.vehicle_info = fields.vehicle_info.clone();
        self.note = fields.note.clone();
        self.isdp_info = fields.isdp_info.clone();
        self.po_info = fields.po_info.clone();
        self.important_note = fields.important_note.clone();
        self.team_name = fields.team_name.clone();
        self.job_mail_body = fields.job_mail_body.clone();
        self.lld_files.retain(|name| !fields.remove_lld.contains(name));
        self.tutanak_files
            .retain(|name| !fields.remove_tutanak.contains(name));
    }

    /// Replaces the assigned people, dropping duplicates but keeping the
    /// original selection order.
    pub fn set_people(&mut self, person_ids: &[PersonId]) {
        self.person_ids.clear();
        for pid in person_ids {
            if !self.person_ids.contains(pid) {
                self.person_ids.push(*pid);
            }
        }
    }
}

/// Writable subset of a cell submitted on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFields {
    /// Shift label to store.
    pub shift: String,
    /// Vehicle info to store.
    pub vehicle_info: String,
    /// Note to store.
    pub note: String,
    /// ISDP reference to store.
    pub isdp_info: String,
    /// Purchase-order reference to store.
    pub po_info: String,
    /// Highlighted note to store.
    pub important_note: String,
    /// Team display name to store.
    pub team_name: String,
    /// Mail-template body to store.
    pub job_mail_body: String,
    /// LLD attachment names to remove from the cell.
    pub remove_lld: Vec<String>,
    /// Report attachment names to remove from the cell.
    pub remove_tutanak: Vec<String>,
}

impl CellFields {
    /// Creates an empty submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shift label.
    #[must_use]
    pub fn with_shift(mut self, shift: impl Into<String>) -> Self {
        self.shift = shift.into();
        self
    }

    /// Sets the vehicle info.
    #[must_use]
    pub fn with_vehicle(mut self, vehicle_info: impl Into<String>) -> Self {
        self.vehicle_info = vehicle_info.into();
        self
    }

    /// Sets the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Sets the team display name.
    #[must_use]
    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = team_name.into();
        self
    }
}

/// A person from the immutable session reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier.
    pub id: PersonId,
    /// Display name.
    pub full_name: String,
    /// Firm affiliation.
    pub firm: String,
    /// Home team name.
    pub team: String,
    /// Skill level label.
    pub skill_level: String,
}

/// Stored day status of one person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonDayStatus {
    /// Free to be assigned.
    Available,
    /// On leave; never assignable that day.
    Leave,
    /// Working at the office; never assignable that day.
    Office,
    /// Already in production; never assignable that day.
    Production,
}

impl PersonDayStatus {
    /// Returns `true` for statuses that block assignment with no override.
    pub fn is_hard_block(self) -> bool {
        !matches!(self, Self::Available)
    }

    /// Wire label of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Leave => "leave",
            Self::Office => "office",
            Self::Production => "production",
        }
    }
}

impl Display for PersonDayStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.as_str())
    }
}

/// Why a person was excluded from a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockedStatus {
    /// On leave that day.
    Leave,
    /// At the office that day.
    Office,
    /// In production that day.
    Production,
    /// Already assigned to another project that day.
    BusyElsewhere {
        /// Code of the project the person is already working on.
        project_code: String,
    },
}

impl BlockedStatus {
    /// Maps a stored day status to its blocking reason, if any.
    pub fn from_day_status(status: PersonDayStatus) -> Option<Self> {
        match status {
            PersonDayStatus::Available => None,
            PersonDayStatus::Leave => Some(Self::Leave),
            PersonDayStatus::Office => Some(Self::Office),
            PersonDayStatus::Production => Some(Self::Production),
        }
    }
}

impl Display for BlockedStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Leave => formatter.write_str("leave"),
            Self::Office => formatter.write_str("office"),
            Self::Production => formatter.write_str("production"),
            Self::BusyElsewhere { project_code } => {
                write!(formatter, "busy on {project_code}")
            }
        }
    }
}

/// A person excluded from a commit, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedEntry {
    /// The excluded person.
    pub person: PersonId,
    /// Display name for reporting.
    pub full_name: String,
    /// Why the person is unavailable.
    pub status: BlockedStatus,
}

/// A person already assigned elsewhere on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedPerson {
    /// The busy person.
    pub person: PersonId,
    /// Display name for reporting.
    pub full_name: String,
    /// Code of the project the person is working on.
    pub project_code: String,
}

/// Detached snapshot of one cell used for click-paste and paint.
///
/// Attachments are never copied; a paste leaves the target's attachment
/// lists untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    /// Copied shift label.
    pub shift: String,
    /// Copied vehicle info.
    pub vehicle_info: String,
    /// Copied note.
    pub note: String,
    /// Copied highlighted note.
    pub important_note: String,
    /// Copied team display name.
    pub team_name: String,
    /// Copied people in selection order.
    pub person_ids: Vec<PersonId>,
}

impl ClipboardPayload {
    /// Captures the copyable portion of a cell.
    pub fn from_cell(cell: &Cell) -> Self {
        Self {
            shift: cell.shift.clone(),
            vehicle_info: cell.vehicle_info.clone(),
            note: cell.note.clone(),
            important_note: cell.important_note.clone(),
            team_name: cell.team_name.clone(),
            person_ids: cell.person_ids.clone(),
        }
    }

    /// Builds the save submission that replays this payload onto a target.
    pub fn to_fields(&self) -> CellFields {
        CellFields {
            shift: self.shift.clone(),
            vehicle_info: self.vehicle_info.clone(),
            note: self.note.clone(),
            important_note: self.important_note.clone(),
            team_name: self.team_name.clone(),
            ..CellFields::default()
        }
    }
}

/// How a drag commit treats the source cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveMode {
    /// Exchange the full contents of source and target.
    Swap,
    /// Write the source into the target and empty the source.
    Move,
}

/// Result of a successful cell save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    /// Team name the store settled on, possibly derived server side.
    pub team_name: String,
}

/// Result of a week-duplication operation.
///
/// Bulk copies are sequences of independent per-cell writes; partial
/// success is expected and reported here, never hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySummary {
    /// Number of destination cells written.
    pub copied: usize,
    /// People that prevented individual cells from being copied.
    pub blocked: Vec<BlockedEntry>,
}

/// Opaque per-week staleness token.
///
/// The engine only ever compares tokens for equality and ordering; the
/// inner value is a store detail.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SyncToken(pub i64);

/// Full contents of one displayed week, used for wholesale rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekData {
    /// Cells keyed by coordinate. Coordinates absent here are empty.
    pub cells: HashMap<CellCoord, Cell>,
}
