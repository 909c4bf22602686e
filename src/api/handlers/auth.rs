use anyhow::Context;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{AppState, SharedState};
use crate::db::{self, User};

#[derive(Debug, Deserialize)]
pub struct SigninBody {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    message: &'static str,
    user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    LoggedIn { user_id: String },
    SignedUp { user_id: String },
}

/// Sign in, or sign up when the email has never been seen. A known email with
/// the wrong password is `Unauthorized`.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<AuthOutcome, ApiError> {
    let existing = state.with_db(|conn| db::find_user_by_email(conn, email))?;

    if let Some(user) = existing {
        let candidate = password.to_string();
        let hash = user.password_hash.clone();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &hash))
            .await
            .context("password check task failed")?
            .context("stored password hash is unreadable")?;
        if !matched {
            return Err(ApiError::Unauthorized);
        }
        return Ok(AuthOutcome::LoggedIn { user_id: user.id });
    }

    let plain = password.to_string();
    let cost = state.bcrypt_cost;
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .context("password hash task failed")?
        .context("hashing password")?;

    let user = User {
        id: db::new_id(),
        email: email.to_string(),
        password_hash,
    };
    state.with_db(|conn| db::insert_user(conn, &user))?;
    tracing::info!(user_id = %user.id, "new account created on first sign-in");

    Ok(AuthOutcome::SignedUp { user_id: user.id })
}

pub async fn signin(
    State(state): State<SharedState>,
    payload: Result<Json<SigninBody>, JsonRejection>,
) -> Result<Json<SigninResponse>, ApiError> {
    signin_inner(&state, payload)
        .await
        .map_err(|e| e.logged("Error signing in"))
}

async fn signin_inner(
    state: &AppState,
    payload: Result<Json<SigninBody>, JsonRejection>,
) -> Result<Json<SigninResponse>, ApiError> {
    let Json(body) = payload?;
    let response = match authenticate(state, &body.email, &body.password).await? {
        AuthOutcome::LoggedIn { user_id } => SigninResponse {
            message: "Login successful",
            user_id,
        },
        AuthOutcome::SignedUp { user_id } => SigninResponse {
            message: "Signup successful",
            user_id,
        },
    };
    Ok(Json(response))
}
