//! Texte fuer Clients und Publisher

use guidebot_broadcast::BroadcastErgebnis;
use guidebot_catalog::{CatalogError, IngestBericht};
use guidebot_core::pfad_anzeigen;
use guidebot_navigation::Hinweis;

pub const KEINE_GUIDES: &str = "📭 Es sind noch keine Guides vorhanden. Schau spaeter wieder vorbei!";
pub const UNBEKANNTE_EINGABE: &str = "❓ Unbekannter Befehl. Bitte waehle eine Option aus dem Menue.";
pub const KEINE_EMPFAENGER: &str = "❌ Keine Nutzer fuer den Broadcast vorhanden";
pub const LEERE_NACHRICHT: &str = "❌ Nach Entfernen des Markers ist die Nachricht leer, nichts gesendet";
pub const REGISTRIERUNG_FEHLGESCHLAGEN: &str =
    "⚠️ Anmeldung fehlgeschlagen, bitte spaeter erneut /start senden";
pub const REGISTRY_FEHLER: &str = "⚠️ Nutzerliste konnte nicht gelesen werden, Broadcast abgebrochen";

/// Aufforderung ueber dem Menue
pub fn aufforderung(pfad: &[String]) -> String {
    if pfad.is_empty() {
        "🏠 Hauptmenue\nWaehle eine Kategorie:".to_string()
    } else {
        format!("📂 {}\nWaehle eine Option:", pfad_anzeigen(pfad))
    }
}

/// Beschriftung eines ausgegebenen Mediums: Position und Pfad
pub fn medien_beschriftung(position: usize, gesamt: usize, pfad: &[String]) -> String {
    let ort = if pfad.is_empty() {
        "Hauptmenue".to_string()
    } else {
        pfad_anzeigen(pfad)
    };
    format!("📸 {position}/{gesamt}\n📍 {ort}")
}

pub fn hinweis(h: &Hinweis) -> String {
    match h {
        Hinweis::KategorieNichtGefunden(label) => {
            format!("❌ Kategorie \"{label}\" nicht gefunden")
        }
        Hinweis::KeineMedien => "📭 In dieser Kategorie gibt es keine Medien".to_string(),
        Hinweis::NichtsHier => "📭 Hier gibt es nichts, zurueck eine Ebene".to_string(),
        Hinweis::PfadVeraltet(pfad) => {
            format!("⚠️ \"{pfad}\" existiert nicht mehr, zurueck zum Hauptmenue")
        }
    }
}

pub fn ingest_bestaetigung(bericht: &IngestBericht) -> String {
    format!(
        "✅ Hinzugefuegt!\n📍 Pfad: {}\n📸 Medien: {}",
        bericht.pfad_anzeige(),
        bericht.medien_anzahl
    )
}

pub fn ingest_abgelehnt(fehler: &CatalogError) -> String {
    match fehler {
        CatalogError::ZuWenigeTags { minimum: 1, .. } => {
            "❌ Keine Hashtags gefunden. Beispiel: #Guides #Einstieg".to_string()
        }
        CatalogError::ZuWenigeTags { gefunden, minimum } => {
            format!("❌ Zu wenige Hashtags ({gefunden}), mindestens {minimum} noetig")
        }
        CatalogError::ZuVieleTags { gefunden, maximum } => {
            format!("❌ Zu viele Hashtags ({gefunden}), hoechstens {maximum} erlaubt")
        }
        _ => "⚠️ Speichern fehlgeschlagen, bitte erneut senden".to_string(),
    }
}

pub fn broadcast_bericht(ergebnis: &BroadcastErgebnis) -> String {
    let mut text = format!(
        "📢 Broadcast abgeschlossen!\n✅ Erfolgreich: {}\n❌ Fehlgeschlagen: {}\n👥 Gesamt: {}",
        ergebnis.erfolgreich, ergebnis.fehlgeschlagen, ergebnis.gesamt
    );
    if ergebnis.abgebrochen() {
        text.push_str(&format!("\n⏹ Abgebrochen, nicht versucht: {}", ergebnis.nicht_versucht));
    }
    text
}
