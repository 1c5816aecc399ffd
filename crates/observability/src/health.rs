//! Health-Check-Endpunkt fuer den Guidebot
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime und Persistenz-Status

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    /// Letzter Speichervorgang war erfolgreich
    pub persistenz_ok: bool,
}

/// Geteilter Zustand fuer den Health-Check
///
/// Der Bot meldet nach jedem Speichervorgang, ob er gelungen ist. Ein
/// Persistenzfehler beendet den Prozess nicht, der Status wird nur
/// `degraded`, bis der naechste Speichervorgang gelingt.
#[derive(Clone)]
pub struct HealthState {
    start_time: Arc<Instant>,
    persistenz_ok: Arc<AtomicBool>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::neu()
    }
}

impl HealthState {
    pub fn neu() -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            persistenz_ok: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn persistenz_ok(&self) -> bool {
        self.persistenz_ok.load(Ordering::Relaxed)
    }

    pub fn persistenz_melden(&self, ok: bool) {
        self.persistenz_ok.store(ok, Ordering::Relaxed);
    }

    /// Aktueller Stand als Antwort
    pub fn antwort(&self) -> HealthResponse {
        let persistenz_ok = self.persistenz_ok();
        HealthResponse {
            status: if persistenz_ok {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            persistenz_ok,
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – 200 auch bei `degraded`, der Health-Check soll den Bot nicht neu starten
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.antwort()))
}
