//! Session-Store fuer Navigations-Sessions
//!
//! Explizite Zuordnung ClientId -> NavigationSession. Sessions entstehen beim
//! ersten Kontakt und werden vom Host nach einer Leerlaufzeit ueber
//! [`SessionStore::cleanup_inaktive`] entfernt. Jede Session gehoert genau
//! einem Client; die DashMap sperrt nur den jeweiligen Eintrag, Sessions
//! verschiedener Clients blockieren sich nicht gegenseitig.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use guidebot_core::ClientId;
use tokio::time::Instant;

use crate::session::NavigationSession;

#[derive(Debug)]
struct SessionEintrag {
    session: NavigationSession,
    letzte_aktivitaet: Instant,
}

impl SessionEintrag {
    fn neu(session: NavigationSession) -> Self {
        Self {
            session,
            letzte_aktivitaet: Instant::now(),
        }
    }
}

/// In-Memory Session-Store mit Leerlauf-Bereinigung
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<ClientId, SessionEintrag>,
}

impl SessionStore {
    /// Erstellt einen neuen leeren Session-Store
    pub fn neu() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Gibt die Session des Clients zurueck und legt sie bei Bedarf an
    pub fn get_or_create(&self, client: &ClientId) -> NavigationSession {
        let mut eintrag = self
            .sessions
            .entry(client.clone())
            .or_insert_with(|| SessionEintrag::neu(NavigationSession::neu(client.clone())));
        eintrag.letzte_aktivitaet = Instant::now();
        eintrag.session.clone()
    }

    /// Gibt eine Kopie der Session zurueck, falls vorhanden
    pub fn get(&self, client: &ClientId) -> Option<NavigationSession> {
        self.sessions.get(client).map(|e| e.session.clone())
    }

    /// Speichert die Session (ersetzt eine vorhandene)
    pub fn set(&self, session: NavigationSession) {
        let client = session.client_id().clone();
        self.sessions.insert(client, SessionEintrag::neu(session));
    }

    /// Fuehrt `f` auf der Session des Clients aus (legt sie bei Bedarf an)
    ///
    /// Der Eintrag bleibt waehrend `f` gesperrt. `f` darf daher nicht auf
    /// den Store zugreifen.
    pub fn bearbeiten<R>(
        &self,
        client: &ClientId,
        f: impl FnOnce(&mut NavigationSession) -> R,
    ) -> R {
        let mut eintrag = self
            .sessions
            .entry(client.clone())
            .or_insert_with(|| SessionEintrag::neu(NavigationSession::neu(client.clone())));
        eintrag.letzte_aktivitaet = Instant::now();
        f(&mut eintrag.session)
    }

    /// Entfernt die Session eines Clients
    pub fn entfernen(&self, client: &ClientId) -> bool {
        self.sessions.remove(client).is_some()
    }

    /// Entfernt Sessions, die laenger als `max_leerlauf` inaktiv sind
    pub fn cleanup_inaktive(&self, max_leerlauf: Duration) -> usize {
        let jetzt = Instant::now();
        let vorher = self.sessions.len();
        self.sessions
            .retain(|_, e| jetzt.duration_since(e.letzte_aktivitaet) < max_leerlauf);
        vorher.saturating_sub(self.sessions.len())
    }

    /// Anzahl der gehaltenen Sessions
    pub fn anzahl(&self) -> usize {
        self.sessions.len()
    }
}
