use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::types::{AppState, SharedState, UserQuery};
use crate::db::{self, Student};
use crate::roll::Roll;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentBody {
    name: String,
    roll: Roll,
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRollsBody {
    rolls: Vec<Roll>,
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStudentBody {
    user_id: String,
    roll: Roll,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRollsResponse {
    mismatched_rolls: Vec<Roll>,
}

/// Check-then-insert as two storage calls; concurrent adds of the same roll
/// can both pass the check.
pub fn add_student(state: &AppState, user_id: &str, roll: Roll, name: &str) -> Result<(), ApiError> {
    if state.with_db(|conn| db::student_exists(conn, user_id, &roll))? {
        return Err(ApiError::Conflict("Student with this roll already exists"));
    }
    let student = Student {
        id: db::new_id(),
        name: name.to_string(),
        roll,
        user_id: user_id.to_string(),
    };
    state.with_db(|conn| db::insert_student(conn, &student))
}

/// Submitted rolls with no roster entry, in submitted order.
pub fn check_rolls(state: &AppState, user_id: &str, rolls: Vec<Roll>) -> Result<Vec<Roll>, ApiError> {
    let mut mismatched = Vec::new();
    for roll in rolls {
        if !state.with_db(|conn| db::student_exists(conn, user_id, &roll))? {
            mismatched.push(roll);
        }
    }
    Ok(mismatched)
}

pub fn list_students(state: &AppState, user_id: &str) -> Result<Vec<Student>, ApiError> {
    state.with_db(|conn| db::list_students(conn, user_id))
}

pub fn delete_student(state: &AppState, user_id: &str, roll: &Roll) -> Result<(), ApiError> {
    let removed = state.with_db(|conn| db::delete_student(conn, user_id, roll))?;
    if removed == 0 {
        return Err(ApiError::NotFound("Student not found for the given user"));
    }
    Ok(())
}

pub async fn add_student_handler(
    State(state): State<SharedState>,
    payload: Result<Json<AddStudentBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let run = || {
        let Json(body) = payload?;
        add_student(&state, &body.user_id, body.roll, &body.name)
    };
    run().map_err(|e| e.logged("Error adding new student"))?;
    Ok(Json(json!({ "message": "Student added successfully" })))
}

pub async fn check_rolls_handler(
    State(state): State<SharedState>,
    payload: Result<Json<CheckRollsBody>, JsonRejection>,
) -> Result<Json<CheckRollsResponse>, ApiError> {
    let run = || {
        let Json(body) = payload?;
        check_rolls(&state, &body.user_id, body.rolls)
    };
    let mismatched_rolls = run().map_err(|e| e.logged("Error checking mismatched rolls"))?;
    Ok(Json(CheckRollsResponse { mismatched_rolls }))
}

pub async fn get_students_handler(
    State(state): State<SharedState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let run = || {
        let Query(q) = query?;
        list_students(&state, &q.user_id)
    };
    let students = run().map_err(|e| e.logged("Error fetching students"))?;
    Ok(Json(students))
}

pub async fn delete_student_handler(
    State(state): State<SharedState>,
    payload: Result<Json<DeleteStudentBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let run = || {
        let Json(body) = payload?;
        delete_student(&state, &body.user_id, &body.roll)
    };
    run().map_err(|e| e.logged("Error deleting student"))?;
    Ok(Json(json!({ "message": "Student deleted successfully" })))
}
