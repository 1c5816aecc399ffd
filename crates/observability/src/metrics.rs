//! Prometheus-kompatible Metriken fuer den Guidebot
//!
//! Registrierte Metriken:
//! - `guidebot_medien_eingegangen_total` – Counter: Einsortierte Medien
//! - `guidebot_ingest_abgelehnt_total` – Counter: Abgelehnte Beitraege (zu wenige/viele Tags)
//! - `guidebot_navigation_schritte_total` – Counter: Navigationsschritte (aktion)
//! - `guidebot_pfad_zurueckgesetzt_total` – Counter: Veraltete Pfade, die zur Wurzel fuehrten
//! - `guidebot_broadcasts_total` – Counter: Gestartete Broadcasts (modus)
//! - `guidebot_broadcast_zustellungen_total` – Counter: Broadcast-Sendungen (ergebnis)
//! - `guidebot_persistenz_fehler_total` – Counter: Fehlgeschlagene Speichervorgaenge
//! - `guidebot_aktive_sessions` – Gauge: Gehaltene Navigations-Sessions
//! - `guidebot_verbundene_clients` – Gauge: Offene Gateway-Verbindungen

use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Alle Guidebot-Prometheus-Metriken
///
/// Clone teilt die Registry; alle Klone zaehlen in dieselben Metriken.
#[derive(Clone)]
pub struct GuidebotMetrics {
    pub registry: Arc<Registry>,

    // Katalog
    pub medien_eingegangen: IntCounter,
    pub ingest_abgelehnt: IntCounter,
    pub persistenz_fehler: IntCounter,

    // Navigation
    pub navigation_schritte: IntCounterVec,
    pub pfad_zurueckgesetzt: IntCounter,
    pub aktive_sessions: IntGauge,

    // Broadcast
    pub broadcasts: IntCounterVec,
    pub broadcast_zustellungen: IntCounterVec,

    // Transport
    pub verbundene_clients: IntGauge,
}

impl GuidebotMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let medien_eingegangen = IntCounter::with_opts(Opts::new(
            "guidebot_medien_eingegangen_total",
            "Anzahl einsortierter Medien",
        ))?;
        registry.register(Box::new(medien_eingegangen.clone()))?;

        let ingest_abgelehnt = IntCounter::with_opts(Opts::new(
            "guidebot_ingest_abgelehnt_total",
            "Anzahl abgelehnter Beitraege wegen ungueltiger Hashtags",
        ))?;
        registry.register(Box::new(ingest_abgelehnt.clone()))?;

        let persistenz_fehler = IntCounter::with_opts(Opts::new(
            "guidebot_persistenz_fehler_total",
            "Anzahl fehlgeschlagener Speichervorgaenge",
        ))?;
        registry.register(Box::new(persistenz_fehler.clone()))?;

        let navigation_schritte = IntCounterVec::new(
            Opts::new(
                "guidebot_navigation_schritte_total",
                "Anzahl ausgefuehrter Navigationsschritte",
            ),
            &["aktion"],
        )?;
        registry.register(Box::new(navigation_schritte.clone()))?;

        let pfad_zurueckgesetzt = IntCounter::with_opts(Opts::new(
            "guidebot_pfad_zurueckgesetzt_total",
            "Anzahl veralteter Session-Pfade, die zur Wurzel zurueckgesetzt wurden",
        ))?;
        registry.register(Box::new(pfad_zurueckgesetzt.clone()))?;

        let aktive_sessions = IntGauge::with_opts(Opts::new(
            "guidebot_aktive_sessions",
            "Anzahl gehaltener Navigations-Sessions",
        ))?;
        registry.register(Box::new(aktive_sessions.clone()))?;

        let broadcasts = IntCounterVec::new(
            Opts::new("guidebot_broadcasts_total", "Anzahl gestarteter Broadcasts"),
            &["modus"],
        )?;
        registry.register(Box::new(broadcasts.clone()))?;

        let broadcast_zustellungen = IntCounterVec::new(
            Opts::new(
                "guidebot_broadcast_zustellungen_total",
                "Broadcast-Sendungen nach Ergebnis",
            ),
            &["ergebnis"],
        )?;
        registry.register(Box::new(broadcast_zustellungen.clone()))?;

        let verbundene_clients = IntGauge::with_opts(Opts::new(
            "guidebot_verbundene_clients",
            "Anzahl offener Gateway-Verbindungen",
        ))?;
        registry.register(Box::new(verbundene_clients.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            medien_eingegangen,
            ingest_abgelehnt,
            persistenz_fehler,
            navigation_schritte,
            pfad_zurueckgesetzt,
            aktive_sessions,
            broadcasts,
            broadcast_zustellungen,
            verbundene_clients,
        })
    }

    /// Zaehlt das Ergebnis eines Broadcasts
    pub fn broadcast_erfassen(&self, modus: &str, erfolgreich: usize, fehlgeschlagen: usize) {
        self.broadcasts.with_label_values(&[modus]).inc();
        self.broadcast_zustellungen
            .with_label_values(&["erfolg"])
            .inc_by(erfolgreich as u64);
        self.broadcast_zustellungen
            .with_label_values(&["fehler"])
            .inc_by(fehlgeschlagen as u64);
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: GuidebotMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<GuidebotMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(fehler = %err, "Metriken-Export fehlgeschlagen");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metriken_erstellen_erfolgreich() {
        let metriken = GuidebotMetrics::neu().unwrap();
        assert!(!metriken.registry.gather().is_empty());
    }

    #[test]
    fn klone_teilen_zaehler() {
        let metriken = GuidebotMetrics::neu().unwrap();
        let klon = metriken.clone();
        klon.medien_eingegangen.inc();
        klon.aktive_sessions.set(3);
        assert_eq!(metriken.medien_eingegangen.get(), 1);
        assert_eq!(metriken.aktive_sessions.get(), 3);
    }

    #[test]
    fn broadcast_erfassen_zaehlt_nach_ergebnis() {
        let metriken = GuidebotMetrics::neu().unwrap();
        metriken.broadcast_erfassen("sofort", 2, 1);
        metriken.broadcast_erfassen("still", 4, 0);

        assert_eq!(metriken.broadcasts.with_label_values(&["sofort"]).get(), 1);
        assert_eq!(
            metriken.broadcast_zustellungen.with_label_values(&["erfolg"]).get(),
            6
        );
        assert_eq!(
            metriken.broadcast_zustellungen.with_label_values(&["fehler"]).get(),
            1
        );
    }

    #[test]
    fn export_im_prometheus_format() {
        let metriken = GuidebotMetrics::neu().unwrap();
        metriken.navigation_schritte.with_label_values(&["descend"]).inc();
        metriken.pfad_zurueckgesetzt.inc();

        let output = metriken.exportieren().unwrap();
        assert!(output.contains("guidebot_navigation_schritte_total{aktion=\"descend\"} 1"));
        assert!(output.contains("guidebot_pfad_zurueckgesetzt_total 1"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }
}
