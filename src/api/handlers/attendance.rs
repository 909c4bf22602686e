use anyhow::anyhow;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AppState, SharedState, UserQuery};
use crate::db::{self, AttendanceRecord};
use crate::reconcile::{self, posting_date, recorded_message};
use crate::roll::Roll;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAttendanceBody {
    user_id: String,
    rolls: Vec<Roll>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAttendanceQuery {
    user_id: String,
    attendance_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttendanceOutcome {
    /// No submitted roll is on the roster; nothing was stored.
    NoMatchingRolls,
    Recorded { id: String, excluded: Vec<Roll> },
}

impl AttendanceOutcome {
    pub fn message(&self) -> String {
        match self {
            AttendanceOutcome::NoMatchingRolls => "Rolls don't exist".to_string(),
            AttendanceOutcome::Recorded { excluded, .. } => recorded_message(excluded),
        }
    }
}

/// Reads the roster, partitions `submitted` against it and stores a record
/// dated today. The roster read and the insert are separate storage calls.
pub fn record_attendance(
    state: &AppState,
    user_id: &str,
    submitted: &[Roll],
) -> Result<AttendanceOutcome, ApiError> {
    let roster = state.with_db(|conn| db::roster_rolls(conn, user_id))?;
    let rec = reconcile::reconcile(&roster, submitted);
    if rec.is_empty() {
        return Ok(AttendanceOutcome::NoMatchingRolls);
    }

    let record = AttendanceRecord {
        id: db::new_id(),
        user_id: user_id.to_string(),
        date: posting_date(chrono::Local::now().date_naive()),
        present_rolls: rec.present,
        absent_rolls: rec.absent,
    };
    state.with_db(|conn| db::insert_attendance(conn, &record))?;
    tracing::debug!(
        user_id,
        present = record.present_rolls.len(),
        absent = record.absent_rolls.len(),
        "attendance recorded"
    );

    Ok(AttendanceOutcome::Recorded {
        id: record.id,
        excluded: rec.excluded,
    })
}

pub fn list_attendance(state: &AppState, user_id: &str) -> Result<Vec<AttendanceRecord>, ApiError> {
    state.with_db(|conn| db::list_attendance(conn, user_id))
}

/// Wrong owner and unknown id both come back as `NotFound`.
pub fn delete_attendance(state: &AppState, user_id: &str, attendance_id: &str) -> Result<(), ApiError> {
    let id = Uuid::parse_str(attendance_id)
        .map_err(|e| ApiError::Malformed(format!("attendanceId {attendance_id:?}: {e}")))?;
    let removed = state.with_db(|conn| db::delete_attendance(conn, user_id, &id.to_string()))?;
    match removed {
        0 => Err(ApiError::NotFound("Attendance record not found for the given user")),
        1 => Ok(()),
        n => Err(anyhow!("deleted {n} attendance records with id {id}").into()),
    }
}

pub async fn add_attendance_handler(
    State(state): State<SharedState>,
    payload: Result<Json<AddAttendanceBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let run = || {
        let Json(body) = payload?;
        record_attendance(&state, &body.user_id, &body.rolls)
    };
    let outcome = run().map_err(|e| e.logged("Error adding attendance"))?;
    Ok(Json(json!({ "message": outcome.message() })))
}

pub async fn get_attendance_handler(
    State(state): State<SharedState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let run = || {
        let Query(q) = query?;
        list_attendance(&state, &q.user_id)
    };
    let records = run().map_err(|e| e.logged("Error fetching attendance data"))?;
    Ok(Json(records))
}

pub async fn delete_attendance_handler(
    State(state): State<SharedState>,
    query: Result<Query<DeleteAttendanceQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let run = || {
        let Query(q) = query?;
        delete_attendance(&state, &q.user_id, &q.attendance_id)
    };
    run().map_err(|e| e.logged("Error deleting attendance record"))?;
    Ok(Json(json!({ "message": "Attendance record deleted successfully" })))
}
