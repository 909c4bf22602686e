use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use rusqlite::Connection;
use serde::Deserialize;

use super::error::ApiError;

pub type SharedState = Arc<AppState>;

/// Process-wide state handed to every handler. The connection is opened once
/// at startup and never replaced.
pub struct AppState {
    db: Mutex<Connection>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(conn: Connection, bcrypt_cost: u32) -> SharedState {
        Arc::new(Self {
            db: Mutex::new(conn),
            bcrypt_cost,
        })
    }

    /// Runs one storage call. The lock is released before returning, so two
    /// calls from the same handler are not atomic with respect to each other.
    pub fn with_db<T>(
        &self,
        f: impl FnOnce(&Connection) -> anyhow::Result<T>,
    ) -> Result<T, ApiError> {
        let conn = self
            .db
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))?;
        Ok(f(&*conn)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
}
