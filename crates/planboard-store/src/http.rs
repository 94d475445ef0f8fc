//! HTTP JSON client for the plan backend.
//!
//! Paths mirror the backend's `/api/*` routes. The one addition is
//! `/api/week_cells`, the JSON source for wholesale week rebuilds; the
//! legacy frontend re-rendered server side instead of fetching data.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use planboard_core::{
    AssignedPerson, BlockedEntry, BlockedStatus, Cell, CellCoord, CellFields, CopySummary, Error,
    MoveMode, PersonDayStatus, PersonId, PlanStore, ProjectId, Result, SaveOutcome, SyncToken,
    WeekData, WeekStart,
};

/// [`PlanStore`] implementation over the backend's JSON API.
#[derive(Debug, Clone)]
pub struct HttpPlanStore {
    /// HTTP client for API requests.
    client: Client,
    /// Base URL of the backend, without a trailing slash.
    base_url: String,
}

impl HttpPlanStore {
    /// Creates a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::default(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Wire form of a stored cell.
#[derive(Debug, Default, Deserialize)]
struct CellDto {
    #[serde(default)]
    shift: String,
    #[serde(default)]
    vehicle_info: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    isdp_info: String,
    #[serde(default)]
    po_info: String,
    #[serde(default)]
    important_note: String,
    #[serde(default)]
    team_name: String,
    #[serde(default)]
    job_mail_body: String,
    #[serde(default)]
    lld_hhd_files: Vec<String>,
    #[serde(default)]
    tutanak_files: Vec<String>,
}

/// Response of `GET /api/cell`.
#[derive(Debug, Deserialize)]
struct GetCellDto {
    #[serde(default)]
    exists: bool,
    cell: Option<CellDto>,
    #[serde(default)]
    assigned: Vec<i64>,
}

/// Error payload carried on non-success responses.
#[derive(Debug, Deserialize)]
struct ApiErrorDto {
    error: Option<String>,
    blocked: Option<Vec<BlockedDto>>,
}

/// Wire form of one blocked entry.
#[derive(Debug, Deserialize)]
struct BlockedDto {
    person_id: i64,
    #[serde(default)]
    full_name: String,
    status: String,
}

/// Response of a successful `POST /api/cell`.
#[derive(Debug, Deserialize)]
struct SaveCellDto {
    #[serde(default)]
    team_name: String,
}

/// Response of the copy endpoints.
#[derive(Debug, Deserialize)]
struct CopyDto {
    #[serde(default)]
    copied_count: usize,
}

/// Response of `GET /api/person_assigned`.
#[derive(Debug, Deserialize)]
struct AssignedDto {
    #[serde(default)]
    assigned_people: Vec<AssignedPersonDto>,
}

/// One busy person with project context.
#[derive(Debug, Deserialize)]
struct AssignedPersonDto {
    person_id: i64,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    project_code: String,
}

/// Response of `GET /api/person_status_day`.
#[derive(Debug, Deserialize)]
struct StatusDayDto {
    #[serde(default)]
    status_by_person: HashMap<String, PersonStatusDto>,
}

/// One stored status record.
#[derive(Debug, Deserialize)]
struct PersonStatusDto {
    status: String,
}

/// Response of `GET /api/plan_sync`.
#[derive(Debug, Deserialize)]
struct PlanSyncDto {
    last_update: Option<f64>,
}

/// Response of `GET /api/week_cells`.
#[derive(Debug, Deserialize)]
struct WeekCellsDto {
    #[serde(default)]
    cells: Vec<WeekCellDto>,
}

/// One cell in a week payload.
#[derive(Debug, Deserialize)]
struct WeekCellDto {
    project_id: i64,
    work_date: NaiveDate,
    cell: CellDto,
    #[serde(default)]
    assigned: Vec<i64>,
}

/// Maps a wire status label to the typed day status.
fn parse_day_status(label: &str) -> Result<PersonDayStatus> {
    match label {
        "available" => Ok(PersonDayStatus::Available),
        "leave" => Ok(PersonDayStatus::Leave),
        "office" => Ok(PersonDayStatus::Office),
        "production" => Ok(PersonDayStatus::Production),
        other => Err(Error::Store(format!("unknown day status `{other}`"))),
    }
}

/// Maps a wire blocked entry to the typed form.
fn parse_blocked(dto: BlockedDto) -> Result<BlockedEntry> {
    let status = match dto.status.as_str() {
        "leave" => BlockedStatus::Leave,
        "office" => BlockedStatus::Office,
        "production" => BlockedStatus::Production,
        other => {
            return Err(Error::Store(format!("unknown blocked status `{other}`")));
        }
    };
    Ok(BlockedEntry {
        person: PersonId(dto.person_id),
        full_name: dto.full_name,
        status,
    })
}

/// Builds a cell from its wire form plus the assignment list.
fn cell_from_dto(dto: CellDto, assigned: &[i64]) -> Cell {
    let mut cell = Cell {
        shift: dto.shift,
        vehicle_info: dto.vehicle_info,
        note: dto.note,
        isdp_info: dto.isdp_info,
        po_info: dto.po_info,
        important_note: dto.important_note,
        team_name: dto.team_name,
        job_mail_body: dto.job_mail_body,
        lld_files: dto.lld_hhd_files,
        tutanak_files: dto.tutanak_files,
        ..Cell::default()
    };
    let people: Vec<PersonId> = assigned.iter().map(|raw| PersonId(*raw)).collect();
    cell.set_people(&people);
    cell
}

/// Converts the sync timestamp (fractional seconds) into a token.
fn token_from_timestamp(timestamp: f64) -> SyncToken {
    SyncToken((timestamp * 1000.0) as i64)
}

/// Reads a response body, mapping API failures onto the error taxonomy.
async fn read_api<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        if let Ok(payload) = serde_json::from_slice::<ApiErrorDto>(&body) {
            if let Some(blocked) = payload.blocked {
                let entries = blocked
                    .into_iter()
                    .map(parse_blocked)
                    .collect::<Result<Vec<BlockedEntry>>>()?;
                return Err(Error::Blocked(entries));
            }
            if let Some(message) = payload.error {
                return Err(Error::Store(message));
            }
        }
        return Err(Error::Store(format!("HTTP {status}")));
    }
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl PlanStore for HttpPlanStore {
    async fn get_cell(&self, coord: CellCoord) -> Result<Option<Cell>> {
        debug!(%coord, "fetching cell");
        let response = self
            .client
            .get(self.url("/api/cell"))
            .query(&[
                ("project_id", coord.project.0.to_string()),
                ("date", coord.date.to_string()),
            ])
            .send()
            .await?;
        let payload: GetCellDto = read_api(response).await?;
        if !payload.exists {
            return Ok(None);
        }
        let dto = payload.cell.unwrap_or_default();
        Ok(Some(cell_from_dto(dto, &payload.assigned)))
    }

    async fn save_cell(
        &self,
        coord: CellCoord,
        fields: &CellFields,
        person_ids: &[PersonId],
        override_conflicts: bool,
    ) -> Result<SaveOutcome> {
        debug!(%coord, people = person_ids.len(), "saving cell");
        let body = serde_json::json!({
            "project_id": coord.project.0,
            "work_date": coord.date,
            "shift": fields.shift,
            "vehicle_info": fields.vehicle_info,
            "note": fields.note,
            "isdp_info": fields.isdp_info,
            "po_info": fields.po_info,
            "important_note": fields.important_note,
            "team_name": fields.team_name,
            "job_mail_body": fields.job_mail_body,
            "remove_lld_list": fields.remove_lld,
            "remove_tutanak_list": fields.remove_tutanak,
            "person_ids": person_ids.iter().map(|pid| pid.0).collect::<Vec<i64>>(),
            "allow_conflicting_team": override_conflicts,
        });
        let response = self
            .client
            .post(self.url("/api/cell"))
            .json(&body)
            .send()
            .await?;
        let payload: SaveCellDto = read_api(response).await?;
        Ok(SaveOutcome {
            team_name: payload.team_name,
        })
    }

    async fn clear_cell(&self, coord: CellCoord) -> Result<()> {
        debug!(%coord, "clearing cell");
        let body = serde_json::json!({
            "project_id": coord.project.0,
            "work_date": coord.date,
        });
        let response = self
            .client
            .post(self.url("/api/cell/clear"))
            .json(&body)
            .send()
            .await?;
        read_api::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn move_cell(&self, from: CellCoord, to: CellCoord, mode: MoveMode) -> Result<()> {
        debug!(%from, %to, "moving cell");
        let body = serde_json::json!({
            "from_project_id": from.project.0,
            "to_project_id": to.project.0,
            "from_date": from.date,
            "to_date": to.date,
            "mode": mode,
        });
        let response = self
            .client
            .post(self.url("/api/move_cell"))
            .json(&body)
            .send()
            .await?;
        read_api::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn copy_day_to_week(&self, project: ProjectId, week: WeekStart) -> Result<CopySummary> {
        let body = serde_json::json!({
            "project_id": project.0,
            "week_start": week.monday(),
        });
        let response = self
            .client
            .post(self.url("/api/copy_monday_to_week"))
            .json(&body)
            .send()
            .await?;
        let payload: CopyDto = read_api(response).await?;
        Ok(CopySummary {
            copied: payload.copied_count,
            blocked: Vec::new(),
        })
    }

    async fn copy_week_to_next(&self, week: WeekStart) -> Result<CopySummary> {
        let body = serde_json::json!({ "week_start": week.monday() });
        let response = self
            .client
            .post(self.url("/api/copy_week_to_next"))
            .json(&body)
            .send()
            .await?;
        let payload: CopyDto = read_api(response).await?;
        Ok(CopySummary {
            copied: payload.copied_count,
            blocked: Vec::new(),
        })
    }

    async fn copy_week_from_previous(&self, week: WeekStart) -> Result<CopySummary> {
        let body = serde_json::json!({ "week_start": week.monday() });
        let response = self
            .client
            .post(self.url("/api/copy_week_from_previous"))
            .json(&body)
            .send()
            .await?;
        let payload: CopyDto = read_api(response).await?;
        Ok(CopySummary {
            copied: payload.copied_count,
            blocked: Vec::new(),
        })
    }

    async fn assigned_elsewhere(
        &self,
        date: NaiveDate,
        reference: ProjectId,
    ) -> Result<Vec<AssignedPerson>> {
        let response = self
            .client
            .get(self.url("/api/person_assigned"))
            .query(&[
                ("date", date.to_string()),
                ("current_project_id", reference.0.to_string()),
            ])
            .send()
            .await?;
        let payload: AssignedDto = read_api(response).await?;
        Ok(payload
            .assigned_people
            .into_iter()
            .map(|dto| AssignedPerson {
                person: PersonId(dto.person_id),
                full_name: dto.full_name,
                project_code: dto.project_code,
            })
            .collect())
    }

    async fn person_statuses(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<PersonId, PersonDayStatus>> {
        let response = self
            .client
            .get(self.url("/api/person_status_day"))
            .query(&[("date", date.to_string())])
            .send()
            .await?;
        let payload: StatusDayDto = read_api(response).await?;
        let mut statuses = HashMap::new();
        for (raw_id, record) in payload.status_by_person {
            let person = raw_id
                .parse::<i64>()
                .map_err(|_| Error::Store(format!("bad person id `{raw_id}`")))?;
            statuses.insert(PersonId(person), parse_day_status(&record.status)?);
        }
        Ok(statuses)
    }

    async fn sync_token(&self, week: WeekStart) -> Result<Option<SyncToken>> {
        let response = self
            .client
            .get(self.url("/api/plan_sync"))
            .query(&[("date", week.monday().to_string())])
            .send()
            .await?;
        let payload: PlanSyncDto = read_api(response).await?;
        Ok(payload.last_update.map(token_from_timestamp))
    }

    async fn week_cells(&self, week: WeekStart) -> Result<WeekData> {
        let response = self
            .client
            .get(self.url("/api/week_cells"))
            .query(&[("week_start", week.monday().to_string())])
            .send()
            .await?;
        let payload: WeekCellsDto = read_api(response).await?;
        let mut data = WeekData::default();
        for entry in payload.cells {
            let coord = CellCoord::new(ProjectId(entry.project_id), entry.work_date);
            data.cells
                .insert(coord, cell_from_dto(entry.cell, &entry.assigned));
        }
        Ok(data)
    }
}
