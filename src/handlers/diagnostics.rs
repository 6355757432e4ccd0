use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;

/// Collections reported by the diagnostic endpoint.
const MAX_REPORTED_COLLECTIONS: usize = 10;

#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

/// GET /test - store connectivity and whether the connection settings are present
pub async fn test_database(State(state): State<AppState>) -> Json<DiagnosticReport> {
    let db = &state.db;
    let settings = &state.config.database;

    let (database, connection_status, collections) = if db.is_connected() {
        match db.collection_names().await {
            Ok(mut names) => {
                names.truncate(MAX_REPORTED_COLLECTIONS);
                let label = match db.database_name() {
                    Some(name) => format!("connected ({})", name),
                    None => "connected".to_string(),
                };
                (label, "Connected", names)
            }
            Err(e) => {
                let detail: String = e.to_string().chars().take(50).collect();
                tracing::warn!("Diagnostic collection listing failed: {}", e);
                (format!("connected but error: {}", detail), "Connected", Vec::new())
            }
        }
    } else {
        ("not available".to_string(), "Not Connected", Vec::new())
    };

    Json(DiagnosticReport {
        backend: "running".to_string(),
        database,
        database_url: set_label(settings.url.is_some()),
        database_name: set_label(settings.name.is_some()),
        connection_status: connection_status.to_string(),
        collections,
    })
}

fn set_label(present: bool) -> String {
    if present { "set" } else { "not set" }.to_string()
}
