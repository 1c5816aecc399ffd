//! Atomares Schreiben und Laden von JSON-Dokumenten
//!
//! Baum und Registry werden als JSON-Dokumente gehalten. Ein Schreibvorgang
//! gilt erst als abgeschlossen, wenn die Datei synchronisiert und per
//! `rename` an ihren Platz gelegt wurde. Ein Absturz hinterlaesst so
//! entweder die alte oder die neue Version, nie eine halbe.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;

/// Serialisiert `wert` als JSON und ersetzt `pfad` atomar
pub async fn json_schreiben<T: Serialize>(pfad: &Path, wert: &T) -> std::io::Result<()> {
    let daten = serde_json::to_vec_pretty(wert)?;
    atomar_schreiben(pfad, &daten).await
}

/// Laedt ein JSON-Dokument; eine fehlende Datei ergibt `T::default()`
pub async fn json_laden<T: DeserializeOwned + Default>(pfad: &Path) -> std::io::Result<T> {
    match tokio::fs::read(pfad).await {
        Ok(daten) => Ok(serde_json::from_slice(&daten)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(pfad = %pfad.display(), "Datei fehlt, starte leer");
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

/// Schreibt `daten` in eine Temp-Datei daneben, synchronisiert und benennt um
pub async fn atomar_schreiben(pfad: &Path, daten: &[u8]) -> std::io::Result<()> {
    if let Some(eltern) = pfad.parent() {
        if !eltern.as_os_str().is_empty() {
            tokio::fs::create_dir_all(eltern).await?;
        }
    }

    let temp = temp_pfad(pfad);
    let mut datei = tokio::fs::File::create(&temp).await?;
    datei.write_all(daten).await?;
    datei.sync_all().await?;
    drop(datei);

    tokio::fs::rename(&temp, pfad).await?;
    tracing::trace!(pfad = %pfad.display(), bytes = daten.len(), "Dokument geschrieben");
    Ok(())
}

fn temp_pfad(pfad: &Path) -> PathBuf {
    let mut name = pfad
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    pfad.with_file_name(name)
}
