//! API route handlers, organized by resource:
//!
//! - `health`: liveness probe
//! - `auth`: login, registration and the user resource
//! - `projects`: project CRUD with embedded task lists
//! - `tasks`: task CRUD

use serde::Serialize;

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;

/// Confirmation body returned by every delete endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always "OK"
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "OK" }
    }
}
