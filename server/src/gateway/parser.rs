//! Zeilenprotokoll des Gateways
//!
//! Befehle haben das Format:
//!   befehlsname key1=value1 key2="value with spaces" key3=wert3
//!
//! Sonderzeichen in Werten werden mit Backslash escaped:
//!   \s = Leerzeichen, \n = Newline, \\ = Backslash, \| = Pipe
//!
//! Dekodiert wird genau einmal, nach dem Zerlegen in Tokens.

use std::collections::HashMap;

use guidebot_core::MediaRef;

use crate::gateway::error::{GatewayError, GatewayResult};

/// Menue-Eintraege pro ausgegebener Zeile
pub const MENUE_SPALTEN: usize = 2;

/// Eine geparste Befehlszeile
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    /// Befehlsname in Kleinbuchstaben (z.B. "hello", "choose")
    pub name: String,
    pub params: HashMap<String, String>,
}

impl ParsedCommand {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|s| s.as_str())
    }

    /// Gibt einen Pflicht-Parameter zurueck oder einen Fehler
    pub fn required_param(&self, key: &str) -> GatewayResult<&str> {
        self.param(key)
            .ok_or_else(|| GatewayError::ParameterFehlt(key.to_string()))
    }
}

/// Parst eine Befehlszeile
pub fn parse_line(line: &str) -> GatewayResult<ParsedCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Err(GatewayError::Protokoll("Leere Befehlszeile".into()));
    }

    let tokens = tokenize(line);
    let Some((name, rest)) = tokens.split_first() else {
        return Err(GatewayError::Protokoll("Kein Befehlsname".into()));
    };

    let mut params = HashMap::new();
    for token in rest {
        if let Some((key, value)) = token.split_once('=') {
            params.insert(key.to_lowercase(), decode_value(value));
        }
        // Token ohne '=' werden ignoriert (kein Wert)
    }

    Ok(ParsedCommand {
        name: decode_value(name).to_lowercase(),
        params,
    })
}

/// Zerlegt eine Zeile in Tokens, beachtet quoted Strings
///
/// Escape-Sequenzen bleiben unveraendert stehen; ein escaptes
/// Anfuehrungszeichen schaltet den Quote-Modus nicht um.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '\\' => {
                current.push('\\');
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Dekodiert Escape-Sequenzen in einem Wert-String
pub fn decode_value(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('s') => result.push(' '),
                Some('n') => result.push('\n'),
                Some('\\') => result.push('\\'),
                Some('|') => result.push('|'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Kodiert einen Wert fuer die Ausgabe (Escape-Sequenzen einfuegen)
pub fn encode_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(' ', "\\s")
        .replace('\n', "\\n")
        .replace('|', "\\|")
}

/// Erstellt eine Erfolgs-Antwortzeile
pub fn ok_antwort(params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        "ok\n".to_string()
    } else {
        let kv: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, encode_value(v)))
            .collect();
        format!("ok {}\n", kv.join(" "))
    }
}

/// Erstellt eine Fehler-Antwortzeile
pub fn fehler_antwort(code: u32, nachricht: &str) -> String {
    format!("error id={} msg={}\n", code, encode_value(nachricht))
}

/// `media ref=<ref> caption=<text>`
pub fn media_zeile(media: &MediaRef, beschriftung: &str) -> String {
    format!(
        "media ref={} caption={}\n",
        encode_value(media.as_str()),
        encode_value(beschriftung)
    )
}

/// `text msg=<text>`
pub fn text_zeile(text: &str) -> String {
    format!("text msg={}\n", encode_value(text))
}

/// `menu prompt=<text> row=<a>|<b> row=<c>`
///
/// Je [`MENUE_SPALTEN`] Eintraege bilden eine Zeile; innerhalb einer Zeile
/// trennt ein unescaptes `|` die Eintraege.
pub fn menue_zeile(aufforderung: &str, auswahl: &[String]) -> String {
    let mut zeile = format!("menu prompt={}", encode_value(aufforderung));
    for reihe in auswahl.chunks(MENUE_SPALTEN) {
        let eintraege: Vec<String> = reihe.iter().map(|e| encode_value(e)).collect();
        zeile.push_str(" row=");
        zeile.push_str(&eintraege.join("|"));
    }
    zeile.push('\n');
    zeile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_einfacher_befehl() {
        let cmd = parse_line("start").unwrap();
        assert_eq!(cmd.name, "start");
        assert!(cmd.params.is_empty());
    }

    #[test]
    fn parse_befehl_mit_params() {
        let cmd = parse_line("post media=f-1 caption=#Guides\\s#Intro").unwrap();
        assert_eq!(cmd.name, "post");
        assert_eq!(cmd.param("media"), Some("f-1"));
        assert_eq!(cmd.param("caption"), Some("#Guides #Intro"));
    }

    #[test]
    fn parse_quoted_wert() {
        let cmd = parse_line(r#"choose text="🔙 Zurueck""#).unwrap();
        assert_eq!(cmd.param("text"), Some("🔙 Zurueck"));
    }

    #[test]
    fn escapes_werden_nur_einmal_dekodiert() {
        // \\s ist ein literaler Backslash gefolgt von 's'
        let cmd = parse_line(r"say text=a\\sb").unwrap();
        assert_eq!(cmd.param("text"), Some(r"a\sb"));
    }

    #[test]
    fn escaptes_anfuehrungszeichen_in_quotes() {
        let cmd = parse_line(r#"say text="er sagte \"hallo\"""#).unwrap();
        assert_eq!(cmd.param("text"), Some(r#"er sagte "hallo""#));
    }

    #[test]
    fn parse_case_insensitive_name() {
        let cmd = parse_line("HeLLo id=42").unwrap();
        assert_eq!(cmd.name, "hello");
        assert_eq!(cmd.param("id"), Some("42"));
    }

    #[test]
    fn leere_zeile_gibt_fehler() {
        assert!(parse_line("").is_err());
        assert!(parse_line("   ").is_err());
    }

    #[test]
    fn required_param_fehlt() {
        let cmd = parse_line("choose").unwrap();
        assert!(matches!(
            cmd.required_param("text"),
            Err(GatewayError::ParameterFehlt(_))
        ));
    }

    #[test]
    fn ok_antwort_formate() {
        assert_eq!(ok_antwort(&[]), "ok\n");
        assert_eq!(ok_antwort(&[("msg", "bis bald")]), "ok msg=bis\\sbald\n");
    }

    #[test]
    fn fehler_antwort_format() {
        let antwort = fehler_antwort(1003, "Nicht angemeldet");
        assert_eq!(antwort, "error id=1003 msg=Nicht\\sangemeldet\n");
    }

    #[test]
    fn encode_decode_roundtrip() {
        let original = "Hallo Welt\nMit | Pipe und \\ Backslash";
        assert_eq!(decode_value(&encode_value(original)), original);
    }

    #[test]
    fn menue_in_zweier_reihen() {
        let auswahl = vec![
            "📁 Guides".to_string(),
            "📁 Tipps".to_string(),
            "🔙 Zurueck".to_string(),
        ];
        let zeile = menue_zeile("Waehle:", &auswahl);
        assert_eq!(
            zeile,
            "menu prompt=Waehle: row=📁\\sGuides|📁\\sTipps row=🔙\\sZurueck\n"
        );
    }

    #[test]
    fn media_zeile_escaped_beschriftung() {
        let zeile = media_zeile(&MediaRef::from("f-1"), "📸 1/2\n📍 Guides");
        assert_eq!(zeile, "media ref=f-1 caption=📸\\s1/2\\n📍\\sGuides\n");
    }
}
