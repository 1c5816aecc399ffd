//! TCP-Gateway (zeilenbasiert)
//!
//! Format: Befehlsname [key=value ...]\n
//! Antworten: ok [...] oder error id=N msg=...
//!
//! Alles, was eine Verbindung empfaengt (Antworten und Nachrichten des
//! Bots), laeuft durch dieselbe Send-Queue. Die Reihenfolge auf dem
//! Socket entspricht daher der Reihenfolge, in der sie erzeugt wurden.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures_util::StreamExt;
use guidebot_bot::ClientBefehl;
use guidebot_core::InboundEvent;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use crate::gateway::befehl::{befehl_aus_zeile, GatewayBefehl};
use crate::gateway::error::{GatewayError, GatewayResult};
use crate::gateway::outbound::{send_queue, TcpOutbound};
use crate::gateway::parser::{fehler_antwort, ok_antwort, parse_line};
use crate::gateway::session::Verbindung;
use crate::GatewayBot;

/// Erste Zeile jeder Verbindung
pub const BEGRUESSUNG: &str = "GUIDEBOT 1\n";

/// Gateway-Konfiguration
#[derive(Debug, Clone)]
pub struct GatewayKonfig {
    pub bind_addr: String,
    pub max_verbindungen: usize,
    pub zeilenlimit_bytes: usize,
}

impl Default for GatewayKonfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7400".into(),
            max_verbindungen: 1000,
            zeilenlimit_bytes: 8192,
        }
    }
}

/// Gemeinsamer Zustand aller Verbindungen
#[derive(Clone)]
struct GatewayKontext {
    bot: Arc<GatewayBot>,
    outbound: TcpOutbound,
    abbruch: CancellationToken,
    zeilenlimit: usize,
}

/// Gebundenes TCP-Gateway
pub struct GatewayServer {
    listener: TcpListener,
    konfig: GatewayKonfig,
}

impl GatewayServer {
    /// Bindet den Listener; der Port `0` waehlt einen freien Port
    pub async fn binden(konfig: GatewayKonfig) -> Result<Self> {
        let listener = TcpListener::bind(&konfig.bind_addr).await?;
        Ok(Self { listener, konfig })
    }

    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Nimmt Verbindungen an, bis `abbruch` ausgeloest wird
    pub async fn laufen(
        self,
        bot: Arc<GatewayBot>,
        outbound: TcpOutbound,
        abbruch: CancellationToken,
    ) -> Result<()> {
        tracing::info!(addr = %self.lokale_adresse()?, "TCP-Gateway gestartet");

        let kontext = GatewayKontext {
            bot,
            outbound,
            abbruch: abbruch.clone(),
            zeilenlimit: self.konfig.zeilenlimit_bytes,
        };
        // Atomarer Verbindungszaehler fuer max_verbindungen-Enforcement
        let verbindungszaehler = Arc::new(AtomicUsize::new(0));
        let max_verbindungen = self.konfig.max_verbindungen;

        loop {
            let (stream, peer_addr) = tokio::select! {
                _ = abbruch.cancelled() => break,
                angenommen = self.listener.accept() => match angenommen {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(fehler = %e, "Verbindung konnte nicht angenommen werden");
                        continue;
                    }
                },
            };

            let aktuelle = verbindungszaehler.fetch_add(1, Ordering::SeqCst);
            if aktuelle >= max_verbindungen {
                verbindungszaehler.fetch_sub(1, Ordering::SeqCst);
                tracing::warn!(
                    peer = %peer_addr,
                    max = max_verbindungen,
                    "Verbindung abgelehnt: Connection-Limit erreicht"
                );
                // Stream wird durch Drop geschlossen
                continue;
            }

            let kontext = kontext.clone();
            let zaehler = Arc::clone(&verbindungszaehler);
            tokio::spawn(async move {
                let metriken = kontext.bot.metriken().clone();
                metriken.verbundene_clients.inc();
                tracing::debug!(peer = %peer_addr, "Neue Gateway-Verbindung");

                verbindung_behandeln(stream, peer_addr, kontext).await;

                metriken.verbundene_clients.dec();
                zaehler.fetch_sub(1, Ordering::SeqCst);
            });
        }

        tracing::info!("TCP-Gateway beendet");
        Ok(())
    }
}

/// Behandelt eine einzelne Verbindung bis `quit`, EOF oder Shutdown
async fn verbindung_behandeln(stream: TcpStream, peer_addr: SocketAddr, kontext: GatewayKontext) {
    let (reader, writer) = stream.into_split();
    let (tx, rx) = send_queue();
    let mut schreiber = tokio::spawn(zeilen_schreiben(writer, rx, peer_addr));

    let mut zeilen = FramedRead::new(reader, LinesCodec::new_with_max_length(kontext.zeilenlimit));
    let mut verbindung = Verbindung::neu(peer_addr);

    if tx.send(BEGRUESSUNG.to_string()).await.is_err() {
        return;
    }

    loop {
        let naechste = tokio::select! {
            _ = kontext.abbruch.cancelled() => break,
            naechste = zeilen.next() => naechste,
        };

        let zeile = match naechste {
            None => break,
            Some(Ok(zeile)) => zeile,
            Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                let e = GatewayError::ZeileZuLang(kontext.zeilenlimit);
                tracing::warn!(peer = %peer_addr, "Zeile zu lang, Verbindung wird beendet");
                let _ = tx.send(fehler_antwort(e.fehler_code(), &e.to_string())).await;
                break;
            }
            Some(Err(LinesCodecError::Io(e))) => {
                tracing::debug!(peer = %peer_addr, fehler = %e, "Lesefehler auf Gateway-Verbindung");
                break;
            }
        };

        if zeile.trim().is_empty() {
            continue;
        }

        let antwort = match befehl_verarbeiten(&zeile, &mut verbindung, &tx, &kontext).await {
            Ok(antwort) => antwort,
            Err(e) => {
                tracing::debug!(peer = %peer_addr, fehler = %e, "Befehl abgelehnt");
                fehler_antwort(e.fehler_code(), &e.to_string())
            }
        };
        if tx.send(antwort).await.is_err() {
            break;
        }

        if verbindung.ist_beendet() {
            break;
        }
    }

    if let Some(client) = verbindung.beenden() {
        kontext.outbound.trennen(&client, &tx);
    }
    // Writer leert die Queue und endet, sobald der letzte Sender weg ist
    drop(tx);
    tokio::select! {
        _ = &mut schreiber => {}
        _ = kontext.abbruch.cancelled() => schreiber.abort(),
    }

    tracing::debug!(peer = %peer_addr, "Gateway-Verbindung beendet");
}

/// Leert die Send-Queue einer Verbindung in den Socket
async fn zeilen_schreiben(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::Receiver<String>,
    peer_addr: SocketAddr,
) {
    while let Some(zeile) = rx.recv().await {
        if let Err(e) = writer.write_all(zeile.as_bytes()).await {
            tracing::debug!(peer = %peer_addr, fehler = %e, "Schreibfehler auf Gateway-Verbindung");
            return;
        }
    }
    let _ = writer.shutdown().await;
}

/// Verarbeitet eine einzelne Befehlszeile und gibt die Antwort zurueck
async fn befehl_verarbeiten(
    zeile: &str,
    verbindung: &mut Verbindung,
    tx: &mpsc::Sender<String>,
    kontext: &GatewayKontext,
) -> GatewayResult<String> {
    let befehl = befehl_aus_zeile(&parse_line(zeile)?)?;

    // Sonderbefehle: hello, quit
    match &befehl {
        GatewayBefehl::Hello { client } => {
            if let Some(aktuell) = verbindung.client() {
                return Err(GatewayError::BereitsAngemeldet(aktuell.clone()));
            }
            // Die Publisher-ID wird nicht uebernommen, solange sie verbunden ist
            if *client == kontext.bot.einstellungen().publisher
                && kontext.outbound.ist_verbunden(client)
            {
                tracing::warn!(
                    peer = %verbindung.peer,
                    client = %client,
                    "Anmeldung als bereits verbundener Publisher abgelehnt"
                );
                return Err(GatewayError::PublisherBelegt(client.clone()));
            }
            kontext.outbound.verbinden(client.clone(), tx.clone());
            verbindung.anmelden(client.clone());
            tracing::info!(peer = %verbindung.peer, client = %client, "Client angemeldet");
            return Ok(ok_antwort(&[]));
        }
        GatewayBefehl::Quit => {
            if let Some(client) = verbindung.beenden() {
                kontext.outbound.trennen(&client, tx);
            }
            return Ok(ok_antwort(&[("msg", "bis bald")]));
        }
        _ => {}
    }

    let client = verbindung
        .client()
        .cloned()
        .ok_or(GatewayError::NichtAngemeldet)?;
    let bot = &kontext.bot;

    if befehl.nur_publisher() && client != bot.einstellungen().publisher {
        tracing::warn!(client = %client, "Publisher-Befehl von fremder Quelle abgelehnt");
        return Err(GatewayError::NurPublisher);
    }

    match befehl {
        GatewayBefehl::Start => bot.befehl_ausfuehren(&client, ClientBefehl::Start).await,
        GatewayBefehl::Choose { text } => {
            bot.befehl_ausfuehren(&client, ClientBefehl::Eingabe(text))
                .await
        }
        GatewayBefehl::Post {
            media,
            beschriftung,
        } => {
            bot.ereignis_verarbeiten(InboundEvent::ContentPosted {
                absender: client,
                beschriftung,
                media,
            })
            .await
        }
        GatewayBefehl::Say { text } => {
            // Broadcasts dauern; die Verbindung bleibt waehrenddessen bedienbar
            let bot = Arc::clone(bot);
            tokio::spawn(async move {
                bot.ereignis_verarbeiten(InboundEvent::TextPosted {
                    absender: client,
                    text,
                })
                .await;
            });
        }
        GatewayBefehl::Reload => bot.katalog_neu_laden().await?,
        GatewayBefehl::Hello { .. } | GatewayBefehl::Quit => {}
    }

    Ok(ok_antwort(&[]))
}
