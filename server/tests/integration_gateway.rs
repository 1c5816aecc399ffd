//! Integrationstests fuer das TCP-Gateway
//!
//! Jeder Test startet einen echten Server auf einem freien Port mit
//! Katalog und Registry in einem Temp-Verzeichnis.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use guidebot_observability::{GuidebotMetrics, HealthState};
use guidebot_server::config::BotConfig;
use guidebot_server::gateway::{GatewayKonfig, GatewayServer, TcpOutbound, BEGRUESSUNG};
use guidebot_server::{GatewayBot, Server};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

const PUBLISHER: &str = "kanal";

struct TestGateway {
    addr: SocketAddr,
    bot: Arc<GatewayBot>,
    abbruch: CancellationToken,
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.abbruch.cancel();
    }
}

async fn gateway_starten(verzeichnis: &Path, konfig: GatewayKonfig) -> TestGateway {
    let mut config = BotConfig::default();
    config.bot.publisher = PUBLISHER.into();
    config.speicher.katalog_datei = verzeichnis.join("guides.json").to_string_lossy().into_owned();
    config.speicher.registry_datei = verzeichnis.join("clients.json").to_string_lossy().into_owned();
    config.broadcast.verzoegerung_ms = 0;

    let server = Server::neu(config);
    let abbruch = CancellationToken::new();
    let outbound = TcpOutbound::neu();
    let bot = server
        .bot_aufbauen(
            outbound.clone(),
            GuidebotMetrics::neu().unwrap(),
            HealthState::neu(),
            abbruch.clone(),
        )
        .await
        .unwrap();

    let gateway = GatewayServer::binden(konfig).await.unwrap();
    let addr = gateway.lokale_adresse().unwrap();
    tokio::spawn(gateway.laufen(Arc::clone(&bot), outbound, abbruch.clone()));

    TestGateway { addr, bot, abbruch }
}

fn test_konfig() -> GatewayKonfig {
    GatewayKonfig {
        bind_addr: "127.0.0.1:0".into(),
        max_verbindungen: 16,
        zeilenlimit_bytes: 256,
    }
}

struct TestClient {
    zeilen: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn verbinden(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        let mut client = Self {
            zeilen: BufReader::new(reader).lines(),
            writer,
        };
        assert_eq!(client.lesen().await, BEGRUESSUNG.trim_end());
        client
    }

    async fn anmelden(addr: SocketAddr, id: &str) -> Self {
        let mut client = Self::verbinden(addr).await;
        assert_eq!(client.befehl(&format!("hello id={id}")).await, vec!["ok"]);
        client
    }

    async fn senden(&mut self, zeile: &str) {
        self.writer
            .write_all(format!("{zeile}\n").as_bytes())
            .await
            .unwrap();
    }

    async fn naechste(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(5), self.zeilen.next_line())
            .await
            .expect("Zeitueberschreitung beim Lesen")
            .unwrap()
    }

    async fn lesen(&mut self) -> String {
        self.naechste().await.expect("Verbindung unerwartet beendet")
    }

    /// Sendet einen Befehl und sammelt alle Zeilen bis inklusive `ok`/`error`
    async fn befehl(&mut self, zeile: &str) -> Vec<String> {
        self.senden(zeile).await;
        let mut zeilen = Vec::new();
        loop {
            let z = self.lesen().await;
            let ende = z.starts_with("ok") || z.starts_with("error");
            zeilen.push(z);
            if ende {
                return zeilen;
            }
        }
    }

    /// Liest, bis eine Zeile mit `praefix` beginnt
    async fn warten_auf(&mut self, praefix: &str) -> String {
        loop {
            let z = self.lesen().await;
            if z.starts_with(praefix) {
                return z;
            }
        }
    }
}

#[tokio::test]
async fn publisher_postet_und_client_navigiert_zum_medium() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut publisher = TestClient::anmelden(gw.addr, PUBLISHER).await;
    let antwort = publisher
        .befehl(r"post media=f-1 caption=Neu!\s#Guides\s#Intro")
        .await;
    assert_eq!(antwort.len(), 2);
    assert!(antwort[0].starts_with("text msg=✅\\sHinzugefuegt!"));
    assert!(antwort[0].contains("Guides\\s>\\sIntro"));
    assert_eq!(antwort[1], "ok");

    let mut client = TestClient::anmelden(gw.addr, "u1").await;
    let start = client.befehl("start").await;
    assert_eq!(
        start,
        vec![
            "menu prompt=🏠\\sHauptmenue\\nWaehle\\seine\\sKategorie: row=📁\\sGuides|🏠\\sHauptmenue",
            "ok"
        ]
    );

    let guides = client.befehl(r"choose text=📁\sGuides").await;
    assert!(guides[0].starts_with("menu prompt=📂\\sGuides"));
    assert!(guides[0].contains("📁\\sIntro"));

    let intro = client.befehl(r#"choose text="📁 Intro""#).await;
    assert!(intro[0].contains("🖼\\sMedien\\sanzeigen"));

    let medien = client.befehl(r"choose text=🖼\sMedien\sanzeigen").await;
    assert_eq!(
        medien[0],
        "media ref=f-1 caption=📸\\s1/1\\n📍\\sGuides\\s>\\sIntro"
    );
    assert!(medien[1].starts_with("menu "));
    assert_eq!(medien[2], "ok");

    // Katalog und Registry liegen auf der Platte
    let katalog = std::fs::read_to_string(dir.path().join("guides.json")).unwrap();
    assert!(katalog.contains("f-1"));
    let registry = std::fs::read_to_string(dir.path().join("clients.json")).unwrap();
    assert!(registry.contains("u1"));
}

#[tokio::test]
async fn befehle_vor_hello_werden_abgelehnt() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut client = TestClient::verbinden(gw.addr).await;
    let antwort = client.befehl("start").await;
    assert_eq!(antwort.len(), 1);
    assert!(antwort[0].starts_with("error id=1003"));

    let unbekannt = client.befehl("serverinfo").await;
    assert!(unbekannt[0].starts_with("error id=1001"));
}

#[tokio::test]
async fn doppeltes_hello_wird_abgelehnt() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut client = TestClient::anmelden(gw.addr, "u1").await;
    let antwort = client.befehl("hello id=u2").await;
    assert!(antwort[0].starts_with("error id=1004"));
}

#[tokio::test]
async fn verbundener_publisher_kann_nicht_uebernommen_werden() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut publisher = TestClient::anmelden(gw.addr, PUBLISHER).await;
    let mut fremder = TestClient::verbinden(gw.addr).await;
    let antwort = fremder.befehl(&format!("hello id={PUBLISHER}")).await;
    assert!(antwort[0].starts_with("error id=1007"), "{antwort:?}");
    // Ohne Anmeldung bleiben Publisher-Befehle gesperrt
    assert!(fremder.befehl("reload").await[0].starts_with("error id=1003"));

    // Der echte Publisher behaelt seine Verbindung und bekommt die Bestaetigung
    let antwort = publisher.befehl("post media=f-1 caption=#Guides").await;
    assert!(antwort.iter().any(|z| z.starts_with("text msg=✅")), "{antwort:?}");

    // Nach dem Abmelden ist die ID wieder frei
    assert!(publisher.befehl("quit").await[0].starts_with("ok"));
    assert_eq!(fremder.befehl(&format!("hello id={PUBLISHER}")).await, vec!["ok"]);
}

#[tokio::test]
async fn fremde_quelle_darf_nicht_veroeffentlichen() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut client = TestClient::anmelden(gw.addr, "u1").await;
    for befehl in ["say text=hallo", "post media=f-1 caption=#A", "reload"] {
        let antwort = client.befehl(befehl).await;
        assert!(antwort[0].starts_with("error id=1005"), "{befehl}: {antwort:?}");
    }
    assert!(gw.bot.tree().snapshot().ist_leer());
}

#[tokio::test]
async fn sofort_broadcast_erreicht_alle_und_meldet_bericht() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut a = TestClient::anmelden(gw.addr, "a").await;
    let mut b = TestClient::anmelden(gw.addr, "b").await;
    // Leerer Katalog: Start meldet "keine Guides", registriert aber
    assert!(a.befehl("start").await[0].starts_with("text msg=📭"));
    assert!(b.befehl("start").await[0].starts_with("text msg=📭"));

    let mut publisher = TestClient::anmelden(gw.addr, PUBLISHER).await;
    publisher.senden(r"say text=Neues\sUpdate\s#JetztSenden").await;

    assert_eq!(a.warten_auf("text msg=Neues").await, "text msg=Neues\\sUpdate");
    assert_eq!(b.warten_auf("text msg=Neues").await, "text msg=Neues\\sUpdate");

    let bericht = publisher.warten_auf("text msg=📢").await;
    assert!(bericht.contains("Erfolgreich:\\s2"));
    assert!(bericht.contains("Fehlgeschlagen:\\s0"));
    assert!(bericht.contains("Gesamt:\\s2"));
}

#[tokio::test]
async fn getrennter_client_zaehlt_als_fehlgeschlagen() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut a = TestClient::anmelden(gw.addr, "a").await;
    a.befehl("start").await;
    {
        let mut weg = TestClient::anmelden(gw.addr, "weg").await;
        weg.befehl("start").await;
        assert_eq!(weg.befehl("quit").await, vec!["ok msg=bis\\sbald"]);
        assert_eq!(weg.naechste().await, None);
    }

    let mut publisher = TestClient::anmelden(gw.addr, PUBLISHER).await;
    publisher.senden(r"say text=Hallo\s#jetztsenden").await;

    assert_eq!(a.warten_auf("text msg=Hallo").await, "text msg=Hallo");
    let bericht = publisher.warten_auf("text msg=📢").await;
    assert!(bericht.contains("Erfolgreich:\\s1"));
    assert!(bericht.contains("Fehlgeschlagen:\\s1"));
}

#[tokio::test]
async fn reload_uebernimmt_extern_geaenderten_katalog() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    std::fs::write(
        dir.path().join("guides.json"),
        r#"{"children":{"Tipps":{"media":["t-1","t-2"]}}}"#,
    )
    .unwrap();

    let mut publisher = TestClient::anmelden(gw.addr, PUBLISHER).await;
    assert_eq!(publisher.befehl("reload").await, vec!["ok"]);

    let mut client = TestClient::anmelden(gw.addr, "u1").await;
    let start = client.befehl("start").await;
    assert!(start[0].contains("row=📁\\sTipps"));
}

#[tokio::test]
async fn zu_lange_zeile_beendet_verbindung() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut client = TestClient::verbinden(gw.addr).await;
    client.senden(&format!("say text={}", "x".repeat(400))).await;
    assert!(client.lesen().await.starts_with("error id=1006"));
    assert_eq!(client.naechste().await, None);
}

#[tokio::test]
async fn connection_limit_weist_ueberzaehlige_ab() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(
        dir.path(),
        GatewayKonfig {
            max_verbindungen: 1,
            ..test_konfig()
        },
    )
    .await;

    let _erster = TestClient::verbinden(gw.addr).await;

    let stream = TcpStream::connect(gw.addr).await.unwrap();
    let mut zweiter = BufReader::new(stream).lines();
    let zeile = tokio::time::timeout(Duration::from_secs(5), zweiter.next_line())
        .await
        .unwrap();
    // Verbindung wird ohne Begruessung geschlossen
    assert!(matches!(zeile, Ok(None) | Err(_)));
}

#[tokio::test]
async fn unbekannte_eingabe_und_metriken() {
    let dir = tempfile::tempdir().unwrap();
    let gw = gateway_starten(dir.path(), test_konfig()).await;

    let mut client = TestClient::anmelden(gw.addr, "u1").await;
    let antwort = client.befehl("choose text=blabla").await;
    assert_eq!(antwort.len(), 2);
    assert!(antwort[0].starts_with("text msg=❓"));
    assert_eq!(gw.bot.metriken().verbundene_clients.get(), 1);
}
