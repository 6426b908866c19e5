use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use axum::extract::State;
use axum::response::Json;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Number of recent entries returned by the stats endpoint.
const RECENT_ENTRIES: usize = 10;

/// One recorded dismissal of an attention prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissEntry {
    pub id: String,
    /// RFC 3339 timestamp of the dismissal.
    pub timestamp: String,
    /// Site the user was on when they dismissed.
    pub site: String,
    pub instances_waiting: u32,
    /// Which widget was dismissed ("notification", "overlay", ...).
    pub dismiss_type: String,
}

/// On-disk document: the append-only entry list plus rolling counters
/// by day, hour of day, and site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DismissLogData {
    pub entries: Vec<DismissEntry>,
    pub by_day: BTreeMap<String, u32>,
    pub by_hour: BTreeMap<String, u32>,
    pub by_site: BTreeMap<String, u32>,
}

/// Dismissal history backed by a JSON document on disk. The in-memory
/// copy is authoritative; disk writes are best effort.
pub struct DismissLog {
    data: DismissLogData,
}

impl DismissLog {
    /// Load from `path`. A missing or unreadable file starts empty; a
    /// corrupt one is recovered as empty rather than crashing.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let data = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "dismissal log is corrupt, starting empty"
                    );
                    DismissLogData::default()
                },
            },
            Err(_) => DismissLogData::default(),
        };
        Self { data }
    }

    /// Record a dismissal, bumping the rolling counters. Returns a
    /// snapshot of the document for persistence outside the lock.
    pub fn record(&mut self, entry: DismissEntry) -> DismissLogData {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&entry.timestamp) {
            let day = ts.format("%Y-%m-%d").to_string();
            let hour = format!("{:02}", ts.hour());
            *self.data.by_day.entry(day).or_default() += 1;
            *self.data.by_hour.entry(hour).or_default() += 1;
        }
        *self.data.by_site.entry(entry.site.clone()).or_default() += 1;
        self.data.entries.push(entry);
        self.data.clone()
    }

    /// Drop all history. Returns the (empty) snapshot for persistence.
    pub fn clear(&mut self) -> DismissLogData {
        self.data = DismissLogData::default();
        self.data.clone()
    }

    pub fn stats(&self) -> DismissStats {
        DismissStats {
            total: self.data.entries.len(),
            by_day: self.data.by_day.clone(),
            by_hour: self.data.by_hour.clone(),
            by_site: self.data.by_site.clone(),
            recent: self
                .data
                .entries
                .iter()
                .rev()
                .take(RECENT_ENTRIES)
                .cloned()
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn data(&self) -> &DismissLogData {
        &self.data
    }
}

/// Write the document to disk. Failures are logged and swallowed; the
/// reporting client never learns about them.
pub async fn persist(path: &Path, data: &DismissLogData) {
    let json = match serde_json::to_string_pretty(data) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize dismissal log");
            return;
        },
    };
    if let Err(e) = tokio::fs::write(path, json).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to persist dismissal log");
    }
}

/// Aggregated dismissal history returned by `GET /api/dismiss-stats`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissStats {
    pub total: usize,
    pub by_day: BTreeMap<String, u32>,
    pub by_hour: BTreeMap<String, u32>,
    pub by_site: BTreeMap<String, u32>,
    /// Most recent entries, newest first.
    pub recent: Vec<DismissEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DismissLogBody {
    pub site: Option<String>,
    pub instances_waiting: Option<u32>,
    pub dismiss_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DismissLogResponse {
    pub success: bool,
    pub entry: DismissEntry,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
}

/// POST /api/dismiss-log — record that a user dismissed a prompt.
pub async fn post_dismiss(
    State(state): State<AppState>,
    Json(body): Json<DismissLogBody>,
) -> Result<Json<DismissLogResponse>, AppError> {
    let Some(site) = body.site.filter(|s| !s.is_empty()) else {
        return Err(AppError::BadRequest("site is required".to_string()));
    };

    let entry = DismissEntry {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: Utc::now().to_rfc3339(),
        site,
        instances_waiting: body.instances_waiting.unwrap_or(0),
        dismiss_type: body.dismiss_type.unwrap_or_else(|| "unknown".to_string()),
    };

    let snapshot = {
        let mut log = state.dismiss_log.write().await;
        log.record(entry.clone())
    };
    persist(&dismiss_log_path(&state), &snapshot).await;

    Ok(Json(DismissLogResponse {
        success: true,
        entry,
    }))
}

/// GET /api/dismiss-stats — aggregated counts plus recent entries.
pub async fn get_stats(State(state): State<AppState>) -> Json<DismissStats> {
    let log = state.dismiss_log.read().await;
    Json(log.stats())
}

/// DELETE /api/dismiss-stats — clear the persisted dismissal history.
pub async fn clear_stats(State(state): State<AppState>) -> Json<ClearResponse> {
    let snapshot = {
        let mut log = state.dismiss_log.write().await;
        log.clear()
    };
    persist(&dismiss_log_path(&state), &snapshot).await;
    Json(ClearResponse { success: true })
}

fn dismiss_log_path(state: &AppState) -> PathBuf {
    PathBuf::from(&state.config.dismiss_log_path)
}
