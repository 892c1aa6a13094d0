//! Health-check handler.
//!
//! `GET /health` answers as long as the process can serve HTTP at all; it
//! touches no data, so it doubles as a liveness probe.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::rally::AppState;
use crate::{Json, Request};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub service: &'static str,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Always `200 OK` with the service version and the current UTC time.
pub async fn health(state: AppState, _req: Request) -> Json<HealthReport> {
    Json(HealthReport {
        service: "ok",
        version: state.version().to_owned(),
        timestamp: Utc::now(),
    })
}
