//! HTTP telemetry client.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::runtime::Handle;
use tracing::warn;
use url::Url;

use super::{EntryType, Telemetry};
use crate::error::{CoreError, TelemetryError};
use crate::storage::Database;

/// Telemetry over a hosted collection backend.
///
/// Requests are spawned on the runtime handle and never awaited by the
/// caller; the session id is generated client-side so the caller always
/// has one even if the backend is down. When a database is attached, the
/// current session id is persisted so a reload can resume attribution.
pub struct HttpTelemetry {
    client: Client,
    endpoint: Url,
    handle: Handle,
    db: Option<Arc<Mutex<Database>>>,
}

impl HttpTelemetry {
    /// `endpoint` must end with a trailing slash for path joins, e.g.
    /// `https://collect.example.com/v1/`.
    pub fn new(endpoint: &str, handle: Handle) -> Result<Self, CoreError> {
        let endpoint = Url::parse(endpoint).map_err(|e| CoreError::Endpoint {
            url: endpoint.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            handle,
            db: None,
        })
    }

    /// Attach the kv store used to persist the current session id.
    pub fn with_database(mut self, db: Arc<Mutex<Database>>) -> Self {
        self.db = Some(db);
        self
    }

    /// The session id persisted by a previous run, if any.
    pub fn resume_session_id(&self) -> Option<String> {
        let db = self.db.as_ref()?;
        match db.lock() {
            Ok(db) => db.current_session_id().ok().flatten(),
            Err(_) => None,
        }
    }

    /// Send one payload and await the outcome. The fire-and-forget trait
    /// methods route through this; it is public so hosts and tests can
    /// flush synchronously when they need to.
    pub async fn send(&self, path: &str, body: Value) -> Result<(), TelemetryError> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| TelemetryError::Request(e.to_string()))?;
        let resp = self.client.post(url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(TelemetryError::Status(resp.status().as_u16()));
        }
        Ok(())
    }

    fn spawn_send(&self, path: &'static str, body: Value) {
        let client = self.client.clone();
        let url = match self.endpoint.join(path) {
            Ok(url) => url,
            Err(e) => {
                warn!(path, error = %e, "telemetry url join failed; event dropped");
                return;
            }
        };
        self.handle.spawn(async move {
            match client.post(url).json(&body).send().await {
                Ok(resp) if !resp.status().is_success() => {
                    warn!(path, status = %resp.status(), "telemetry rejected");
                }
                Ok(_) => {}
                Err(e) => warn!(path, error = %e, "telemetry send failed"),
            }
        });
    }

    fn persist_session_id(&self, id: &str) {
        if let Some(db) = &self.db {
            let result = match db.lock() {
                Ok(db) => db.set_current_session_id(id),
                Err(_) => return,
            };
            if let Err(e) = result {
                warn!(error = %e, "could not persist session id");
            }
        }
    }
}

impl Telemetry for HttpTelemetry {
    fn track_event(&self, event_type: &str, payload: &Value) {
        self.spawn_send(
            "events",
            json!({
                "event_type": event_type,
                "payload": payload,
                "at": Utc::now(),
            }),
        );
    }

    fn start_session(&self, fragrance_id: &str, entry_type: EntryType) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.persist_session_id(&id);
        self.spawn_send(
            "sessions",
            json!({
                "id": id,
                "fragrance_id": fragrance_id,
                "entry_type": entry_type.as_str(),
                "started_at": Utc::now(),
            }),
        );
        id
    }

    fn end_session(&self, session_id: &str, duration_secs: u64, completed: bool) {
        if let Some(db) = &self.db {
            if let Ok(db) = db.lock() {
                if let Err(e) = db.clear_current_session_id() {
                    warn!(error = %e, "could not clear session id");
                }
            }
        }
        self.spawn_send(
            "sessions/end",
            json!({
                "id": session_id,
                "duration_secs": duration_secs,
                "completed": completed,
                "ended_at": Utc::now(),
            }),
        );
    }

    fn record_mood(&self, session_id: &str, mood: &str, context: &str) {
        self.spawn_send(
            "moods",
            json!({
                "session_id": session_id,
                "mood": mood,
                "context": context,
                "at": Utc::now(),
            }),
        );
    }
}
