//! guidebot-server – Bibliotheks-Root
//!
//! Deklariert Konfiguration und Gateway und verdrahtet Katalog, Registry,
//! Bot und Observability zu einem lauffaehigen Server.

pub mod config;
pub mod gateway;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use guidebot_bot::{BotEinstellungen, GuideBot};
use guidebot_broadcast::BroadcastDispatcher;
use guidebot_catalog::{ContentTree, JsonTreeStore};
use guidebot_observability::{observability_server_starten, GuidebotMetrics, HealthState};
use guidebot_registry::JsonRegistry;
use tokio_util::sync::CancellationToken;

use config::BotConfig;
use gateway::{GatewayKonfig, GatewayServer, TcpOutbound};

/// Bot mit Datei-Speicher hinter dem TCP-Gateway
pub type GatewayBot = GuideBot<JsonTreeStore, JsonRegistry, TcpOutbound>;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: BotConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: BotConfig) -> Self {
        Self { config }
    }

    /// Laedt Katalog und Registry und baut den Bot
    pub async fn bot_aufbauen(
        &self,
        outbound: TcpOutbound,
        metriken: GuidebotMetrics,
        health: HealthState,
        abbruch: CancellationToken,
    ) -> Result<Arc<GatewayBot>> {
        let speicher = &self.config.speicher;

        let store = Arc::new(JsonTreeStore::new(&speicher.katalog_datei));
        let tree = ContentTree::laden(store)
            .await
            .with_context(|| format!("Katalog '{}' nicht lesbar", speicher.katalog_datei))?;
        let registry = JsonRegistry::laden(&speicher.registry_datei)
            .await
            .with_context(|| format!("Registry '{}' nicht lesbar", speicher.registry_datei))?;
        let broadcaster = BroadcastDispatcher::neu(self.config.broadcast.clone())?;

        let einstellungen = BotEinstellungen {
            publisher: self.config.publisher(),
            navigation: self.config.navigation.navigation_config(),
            ingest: self.config.katalog.clone(),
        };

        Ok(GuideBot::neu(
            Arc::new(tree),
            Arc::new(registry),
            Arc::new(outbound),
            broadcaster,
            einstellungen,
            metriken,
            health,
            abbruch,
        ))
    }

    /// Startet alle Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Katalog und Registry laden, Bot bauen
    /// 2. Session-Wartung starten
    /// 3. Observability-Server starten (falls aktiviert)
    /// 4. TCP-Gateway binden
    /// 5. Auf Ctrl-C warten, dann alles ueber das Abbruch-Token beenden
    pub async fn starten(self) -> Result<()> {
        let abbruch = CancellationToken::new();
        let metriken = GuidebotMetrics::neu()?;
        let health = HealthState::neu();
        let outbound = TcpOutbound::neu();

        let bot = self
            .bot_aufbauen(
                outbound.clone(),
                metriken.clone(),
                health.clone(),
                abbruch.clone(),
            )
            .await?;

        tracing::info!(
            publisher = %bot.einstellungen().publisher,
            gateway = %self.config.gateway_bind_adresse(),
            normal_modus = %self.config.broadcast.normal_modus,
            "Server startet"
        );

        let navigation = &self.config.navigation;
        let wartung = bot.session_wartung_starten(
            navigation.cleanup_intervall(),
            navigation.leerlauf(),
            abbruch.clone(),
        );

        if self.config.observability.aktiviert {
            let addr: SocketAddr = self
                .config
                .observability_bind_adresse()
                .parse()
                .context("Ungueltige Observability-Adresse")?;
            tokio::spawn(async move {
                if let Err(e) = observability_server_starten(addr, metriken, health).await {
                    tracing::error!(fehler = %e, "Observability-Server beendet");
                }
            });
        }

        let gateway = GatewayServer::binden(GatewayKonfig {
            bind_addr: self.config.gateway_bind_adresse(),
            max_verbindungen: self.config.netzwerk.max_verbindungen,
            zeilenlimit_bytes: self.config.netzwerk.zeilenlimit_bytes,
        })
        .await?;
        let gateway_task = tokio::spawn(gateway.laufen(Arc::clone(&bot), outbound, abbruch.clone()));

        tracing::info!("Guidebot laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Guidebot wird beendet");

        // Bricht Gateway, Wartung und laufende Broadcasts ab
        abbruch.cancel();
        let _ = wartung.await;
        match gateway_task.await {
            Ok(Err(e)) => tracing::warn!(fehler = %e, "Gateway mit Fehler beendet"),
            Err(e) => tracing::warn!(fehler = %e, "Gateway-Task abgebrochen"),
            Ok(Ok(())) => {}
        }

        Ok(())
    }
}
