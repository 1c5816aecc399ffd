//! Uebersetzt geparste Zeilen in Gateway-Befehle

use guidebot_core::{ClientId, MediaRef};

use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::parser::ParsedCommand;

/// Befehl einer Gateway-Verbindung
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayBefehl {
    /// Verbindung einer Client-ID zuordnen
    Hello { client: ClientId },
    /// Registrieren und Hauptmenue anzeigen
    Start,
    /// Menue-Auswahl oder freie Eingabe
    Choose { text: String },
    /// Medium mit Hashtag-Beschriftung einsortieren (nur Publisher)
    Post { media: MediaRef, beschriftung: String },
    /// Text an alle Clients verteilen (nur Publisher)
    Say { text: String },
    /// Katalog aus dem Speicher neu laden (nur Publisher)
    Reload,
    /// Verbindung beenden
    Quit,
}

impl GatewayBefehl {
    /// Befehle, die nur die Publisher-Quelle senden darf
    pub fn nur_publisher(&self) -> bool {
        matches!(self, Self::Post { .. } | Self::Say { .. } | Self::Reload)
    }
}

pub fn befehl_aus_zeile(cmd: &ParsedCommand) -> GatewayResult<GatewayBefehl> {
    match cmd.name.as_str() {
        "hello" => {
            let id = cmd.required_param("id")?.trim();
            if id.is_empty() {
                return Err(GatewayError::ParameterFehlt("id".into()));
            }
            Ok(GatewayBefehl::Hello {
                client: ClientId::new(id),
            })
        }
        "start" => Ok(GatewayBefehl::Start),
        "choose" => Ok(GatewayBefehl::Choose {
            text: cmd.required_param("text")?.to_string(),
        }),
        "post" => Ok(GatewayBefehl::Post {
            media: MediaRef::new(cmd.required_param("media")?),
            // Fehlende Beschriftung wird vom Ingester als "keine Hashtags" abgelehnt
            beschriftung: cmd.param("caption").unwrap_or_default().to_string(),
        }),
        "say" => Ok(GatewayBefehl::Say {
            text: cmd.required_param("text")?.to_string(),
        }),
        "reload" => Ok(GatewayBefehl::Reload),
        "quit" => Ok(GatewayBefehl::Quit),
        other => Err(GatewayError::UnbekannterBefehl(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::parser::parse_line;

    fn befehl(zeile: &str) -> GatewayResult<GatewayBefehl> {
        befehl_aus_zeile(&parse_line(zeile).unwrap())
    }

    #[test]
    fn hello_braucht_id() {
        assert_eq!(
            befehl("hello id=42").unwrap(),
            GatewayBefehl::Hello {
                client: ClientId::from("42")
            }
        );
        assert!(matches!(befehl("hello"), Err(GatewayError::ParameterFehlt(_))));
        assert!(matches!(befehl("hello id="), Err(GatewayError::ParameterFehlt(_))));
    }

    #[test]
    fn post_ohne_caption_ist_leer() {
        assert_eq!(
            befehl("post media=f-1").unwrap(),
            GatewayBefehl::Post {
                media: MediaRef::from("f-1"),
                beschriftung: String::new(),
            }
        );
    }

    #[test]
    fn choose_dekodiert_text() {
        assert_eq!(
            befehl(r"choose text=📁\sGuides").unwrap(),
            GatewayBefehl::Choose {
                text: "📁 Guides".into()
            }
        );
    }

    #[test]
    fn publisher_befehle() {
        assert!(befehl("say text=hi").unwrap().nur_publisher());
        assert!(befehl("reload").unwrap().nur_publisher());
        assert!(!befehl("start").unwrap().nur_publisher());
    }

    #[test]
    fn unbekannter_befehl() {
        assert!(matches!(
            befehl("serverinfo"),
            Err(GatewayError::UnbekannterBefehl(name)) if name == "serverinfo"
        ));
    }
}
