//! GuideBot – zentrale Ablaufsteuerung
//!
//! Der Transport liefert zwei Arten von Eingaben:
//! - Ereignisse der Publisher-Quelle ([`InboundEvent`]): Medien werden
//!   einsortiert, Texte als Broadcast verteilt.
//! - Befehle einzelner Clients ([`ClientBefehl`]): Start und Menue-Auswahl
//!   laufen ueber die Navigation.
//!
//! Kein Fehler beendet den Bot. Validierungsfehler gehen an den Publisher,
//! Navigationsfehler an den Client, Zustellfehler werden geloggt und
//! Persistenzfehler scheitern nur die ausloesende Operation.

use std::sync::Arc;
use std::time::Duration;

use guidebot_broadcast::{BroadcastDispatcher, BroadcastErgebnis};
use guidebot_catalog::{ContentTree, IngestBericht, IngestConfig, TagIngester, TreeStore};
use guidebot_core::{ClientId, GuideError, InboundEvent, MediaRef, Outbound, ZustellFehler};
use guidebot_navigation::{
    aktion_aus_eingabe, Hinweis, NavigationConfig, NavigationSession, Schritt, SessionStore,
};
use guidebot_observability::{GuidebotMetrics, HealthState};
use guidebot_registry::ClientRegistry;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::texte;

/// Laufzeit-Einstellungen des Bots
#[derive(Debug, Clone)]
pub struct BotEinstellungen {
    /// Einzige Quelle, deren Ereignisse verarbeitet werden
    pub publisher: ClientId,
    pub navigation: NavigationConfig,
    pub ingest: IngestConfig,
}

/// Befehl eines einzelnen Clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientBefehl {
    /// Registrieren und Hauptmenue anzeigen
    Start,
    /// Gewaehlte Menue-Beschriftung (oder beliebiger Text)
    Eingabe(String),
}

/// Der Guidebot: Katalog, Navigation, Registry und Broadcast
pub struct GuideBot<S, R, O>
where
    S: TreeStore,
    R: ClientRegistry,
    O: Outbound,
{
    tree: Arc<ContentTree<S>>,
    ingester: TagIngester<S>,
    sessions: Arc<SessionStore>,
    registry: Arc<R>,
    broadcaster: BroadcastDispatcher,
    outbound: Arc<O>,
    einstellungen: BotEinstellungen,
    metriken: GuidebotMetrics,
    health: HealthState,
    /// Bricht laufende Broadcasts beim Herunterfahren ab
    abbruch: CancellationToken,
}

impl<S, R, O> GuideBot<S, R, O>
where
    S: TreeStore,
    R: ClientRegistry,
    O: Outbound,
{
    #[allow(clippy::too_many_arguments)]
    pub fn neu(
        tree: Arc<ContentTree<S>>,
        registry: Arc<R>,
        outbound: Arc<O>,
        broadcaster: BroadcastDispatcher,
        einstellungen: BotEinstellungen,
        metriken: GuidebotMetrics,
        health: HealthState,
        abbruch: CancellationToken,
    ) -> Arc<Self> {
        let ingester = TagIngester::neu(tree.clone(), einstellungen.ingest.clone());
        Arc::new(Self {
            tree,
            ingester,
            sessions: SessionStore::neu(),
            registry,
            broadcaster,
            outbound,
            einstellungen,
            metriken,
            health,
            abbruch,
        })
    }

    pub fn tree(&self) -> &Arc<ContentTree<S>> {
        &self.tree
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn einstellungen(&self) -> &BotEinstellungen {
        &self.einstellungen
    }

    pub fn metriken(&self) -> &GuidebotMetrics {
        &self.metriken
    }

    // -----------------------------------------------------------------------
    // Publisher
    // -----------------------------------------------------------------------

    /// Verarbeitet ein Ereignis der Publisher-Quelle
    ///
    /// Ereignisse anderer Absender werden ignoriert.
    pub async fn ereignis_verarbeiten(&self, ereignis: InboundEvent) {
        if !ereignis.von_publisher(&self.einstellungen.publisher) {
            tracing::debug!(absender = %ereignis.absender(), "Ereignis fremder Quelle ignoriert");
            return;
        }

        match ereignis {
            InboundEvent::ContentPosted {
                beschriftung,
                media,
                ..
            } => {
                // Fehler wurden dem Publisher bereits gemeldet
                let _ = self.inhalt_einsortieren(&beschriftung, media).await;
            }
            InboundEvent::TextPosted { text, .. } => {
                self.text_verteilen(&text).await;
            }
        }
    }

    /// Sortiert ein Medium anhand der Hashtags ein und bestaetigt dem Publisher
    pub async fn inhalt_einsortieren(
        &self,
        beschriftung: &str,
        media: MediaRef,
    ) -> Result<IngestBericht, GuideError> {
        match self.ingester.ingest(beschriftung, media).await {
            Ok(bericht) => {
                self.metriken.medien_eingegangen.inc();
                self.health.persistenz_melden(true);
                self.publisher_antworten(&texte::ingest_bestaetigung(&bericht))
                    .await;
                Ok(bericht)
            }
            Err(e) => {
                if e.ist_validierung() {
                    self.metriken.ingest_abgelehnt.inc();
                } else {
                    self.metriken.persistenz_fehler.inc();
                    self.health.persistenz_melden(false);
                }
                self.publisher_antworten(&texte::ingest_abgelehnt(&e)).await;
                Err(e.into())
            }
        }
    }

    /// Verteilt einen Textbeitrag an alle registrierten Clients
    ///
    /// Gibt `None` zurueck wenn nichts versendet wurde (leere Nachricht oder
    /// Registry nicht lesbar).
    pub async fn text_verteilen(&self, text: &str) -> Option<BroadcastErgebnis> {
        let auftrag = self.broadcaster.vorbereiten(text);
        let mit_bericht = auftrag.modus.mit_bericht();

        if auftrag.text.trim().is_empty() {
            tracing::info!(modus = %auftrag.modus, "Leere Broadcast-Nachricht verworfen");
            if mit_bericht {
                self.publisher_antworten(texte::LEERE_NACHRICHT).await;
            }
            return None;
        }

        let empfaenger = match self.registry.list_all().await {
            Ok(liste) => liste,
            Err(e) => {
                tracing::error!(fehler = %e, "Registry konnte nicht gelesen werden");
                self.metriken.persistenz_fehler.inc();
                if mit_bericht {
                    self.publisher_antworten(texte::REGISTRY_FEHLER).await;
                }
                return None;
            }
        };

        if empfaenger.is_empty() {
            tracing::info!(modus = %auftrag.modus, "Broadcast ohne Empfaenger");
            if mit_bericht {
                self.publisher_antworten(texte::KEINE_EMPFAENGER).await;
            }
            return Some(BroadcastErgebnis::default());
        }

        tracing::info!(
            modus = %auftrag.modus,
            empfaenger = empfaenger.len(),
            "Broadcast gestartet"
        );
        let ergebnis = self
            .broadcaster
            .broadcast_abbrechbar(
                self.outbound.as_ref(),
                &auftrag.text,
                &empfaenger,
                &self.abbruch,
            )
            .await;

        self.metriken.broadcast_erfassen(
            &auftrag.modus.to_string(),
            ergebnis.erfolgreich,
            ergebnis.fehlgeschlagen,
        );
        if mit_bericht {
            self.publisher_antworten(&texte::broadcast_bericht(&ergebnis))
                .await;
        }
        Some(ergebnis)
    }

    /// Laedt den Katalog neu aus dem Speicher
    pub async fn katalog_neu_laden(&self) -> Result<(), GuideError> {
        match self.tree.neu_laden().await {
            Ok(()) => {
                self.health.persistenz_melden(true);
                Ok(())
            }
            Err(e) => {
                tracing::error!(fehler = %e, "Katalog konnte nicht neu geladen werden");
                self.metriken.persistenz_fehler.inc();
                self.health.persistenz_melden(false);
                Err(e.into())
            }
        }
    }

    async fn publisher_antworten(&self, text: &str) {
        let publisher = &self.einstellungen.publisher;
        if let Err(e) = self.outbound.send_text(publisher, text).await {
            tracing::warn!(publisher = %publisher, fehler = %e, "Antwort an Publisher fehlgeschlagen");
        }
    }

    // -----------------------------------------------------------------------
    // Clients
    // -----------------------------------------------------------------------

    pub async fn befehl_ausfuehren(&self, client: &ClientId, befehl: ClientBefehl) {
        match befehl {
            ClientBefehl::Start => self.client_starten(client).await,
            ClientBefehl::Eingabe(text) => self.client_eingabe(client, &text).await,
        }
    }

    /// Registriert den Client und zeigt das Hauptmenue
    ///
    /// Scheitert die Registrierung, bekommt der Client nur einen Hinweis und
    /// kein Menue. Ohne Eintrag in der Registry wuerde er keine Broadcasts
    /// erhalten.
    pub async fn client_starten(&self, client: &ClientId) {
        match self.registry.add_if_absent(client).await {
            Ok(neu) => {
                tracing::info!(client = %client, neu, "Client gestartet");
            }
            Err(e) => {
                tracing::error!(client = %client, fehler = %e, "Client konnte nicht registriert werden");
                self.metriken.persistenz_fehler.inc();
                self.health.persistenz_melden(false);
                self.senden_protokolliert(
                    client,
                    self.outbound
                        .send_text(client, texte::REGISTRIERUNG_FEHLGESCHLAGEN)
                        .await,
                );
                return;
            }
        }

        let wurzel = self.tree.snapshot();
        if wurzel.ist_leer() {
            self.sessions.set(NavigationSession::neu(client.clone()));
            self.sessions_gauge_aktualisieren();
            self.senden_protokolliert(client, self.outbound.send_text(client, texte::KEINE_GUIDES).await);
            return;
        }

        let navigation = &self.einstellungen.navigation;
        let schritt = self
            .sessions
            .bearbeiten(client, |s| s.starten(&wurzel, navigation));
        self.sessions_gauge_aktualisieren();
        self.schritt_senden(client, &schritt).await;
    }

    /// Wendet eine Menue-Auswahl an
    pub async fn client_eingabe(&self, client: &ClientId, eingabe: &str) {
        let Some(aktion) = aktion_aus_eingabe(eingabe) else {
            tracing::debug!(client = %client, eingabe, "Unbekannte Eingabe");
            self.senden_protokolliert(
                client,
                self.outbound.send_text(client, texte::UNBEKANNTE_EINGABE).await,
            );
            return;
        };

        self.metriken
            .navigation_schritte
            .with_label_values(&[aktion.name()])
            .inc();

        let wurzel = self.tree.snapshot();
        let navigation = &self.einstellungen.navigation;
        let schritt = self
            .sessions
            .bearbeiten(client, |s| s.anwenden(aktion, &wurzel, navigation));
        self.sessions_gauge_aktualisieren();

        if schritt
            .hinweise
            .iter()
            .any(|h| matches!(h, Hinweis::PfadVeraltet(_)))
        {
            self.metriken.pfad_zurueckgesetzt.inc();
        }
        self.schritt_senden(client, &schritt).await;
    }

    /// Sendet Hinweise, Medien und das Menue eines Schritts
    ///
    /// Bricht beim ersten Zustellfehler ab, der Client ist dann meist nicht
    /// mehr erreichbar.
    async fn schritt_senden(&self, client: &ClientId, schritt: &Schritt) {
        let ergebnis = self.schritt_zustellen(client, schritt).await;
        self.senden_protokolliert(client, ergebnis);
    }

    async fn schritt_zustellen(
        &self,
        client: &ClientId,
        schritt: &Schritt,
    ) -> Result<(), ZustellFehler> {
        for h in &schritt.hinweise {
            self.outbound.send_text(client, &texte::hinweis(h)).await?;
        }
        for ausgabe in &schritt.medien {
            let beschriftung =
                texte::medien_beschriftung(ausgabe.position, ausgabe.gesamt, &schritt.medien_pfad);
            self.outbound
                .send_media(client, &ausgabe.media, &beschriftung)
                .await?;
        }
        self.outbound
            .send_choice_menu(
                client,
                &texte::aufforderung(&schritt.pfad),
                &schritt.auswahl.labels(),
            )
            .await
    }

    fn senden_protokolliert(&self, client: &ClientId, ergebnis: Result<(), ZustellFehler>) {
        if let Err(e) = ergebnis {
            tracing::warn!(client = %client, fehler = %e, "Antwort konnte nicht zugestellt werden");
        }
    }

    // -----------------------------------------------------------------------
    // Wartung
    // -----------------------------------------------------------------------

    /// Entfernt Sessions, die laenger als `max_leerlauf` inaktiv sind
    pub fn sessions_bereinigen(&self, max_leerlauf: Duration) -> usize {
        let entfernt = self.sessions.cleanup_inaktive(max_leerlauf);
        self.sessions_gauge_aktualisieren();
        if entfernt > 0 {
            tracing::debug!(anzahl = entfernt, "Inaktive Sessions bereinigt");
        }
        entfernt
    }

    fn sessions_gauge_aktualisieren(&self) {
        self.metriken
            .aktive_sessions
            .set(self.sessions.anzahl() as i64);
    }
}

impl<S, R, O> GuideBot<S, R, O>
where
    S: TreeStore + 'static,
    R: ClientRegistry + 'static,
    O: Outbound + 'static,
{
    /// Startet die periodische Session-Bereinigung
    pub fn session_wartung_starten(
        self: &Arc<Self>,
        intervall: Duration,
        max_leerlauf: Duration,
        abbruch: CancellationToken,
    ) -> JoinHandle<()> {
        let bot = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(intervall);
            // Erster Tick feuert sofort
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = abbruch.cancelled() => break,
                    _ = ticker.tick() => {
                        bot.sessions_bereinigen(max_leerlauf);
                    }
                }
            }
            tracing::debug!("Session-Wartung beendet");
        })
    }
}
