//! # Track Catalog
//!
//! SQLite store for imported corpus rows. Values are kept exactly as they
//! arrived (text), so rescaling and deduplication happen in one place:
//! [`Corpus::load`](crate::corpus::Corpus::load).

use crate::corpus::{Corpus, RawTrack};
use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::fs;
use std::path::Path;

const CREATE_TRACKS: &str = "CREATE TABLE IF NOT EXISTS tracks (
    row       INTEGER PRIMARY KEY AUTOINCREMENT,
    spotify_id TEXT,
    track     TEXT,
    artist    TEXT,
    valence   TEXT,
    arousal   TEXT,
    dominance TEXT
)";

/// Open the catalog at `path`, creating the file, its parent directory and
/// the schema when missing.
pub fn open_catalog(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create catalog directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open catalog at {}", path.display()))?;
    conn.execute(CREATE_TRACKS, [])
        .context("Failed to create tracks table")?;

    Ok(conn)
}

/// Start a fresh catalog. An existing catalog that already holds rows is
/// only replaced when `force` is set.
pub fn init_catalog(path: &Path, force: bool) -> Result<Connection> {
    if path.exists() {
        let existing = count_rows(&open_catalog(path)?)?;
        if existing > 0 && !force {
            anyhow::bail!(
                "Catalog at {} already holds {existing} track(s). Use --force to replace it.",
                path.display()
            );
        }
        info!("Replacing catalog at {}", path.display());
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove old catalog {}", path.display()))?;
    }

    open_catalog(path)
}

/// Append `rows` in a single transaction. Returns the number inserted.
pub fn import_rows(conn: &mut Connection, rows: &[RawTrack]) -> Result<usize> {
    let tx = conn.transaction().context("Failed to begin import transaction")?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO tracks (spotify_id, track, artist, valence, arousal, dominance)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .context("Failed to prepare track insert")?;

        for row in rows {
            stmt.execute((
                &row.id,
                &row.track,
                &row.artist,
                &row.valence,
                &row.arousal,
                &row.dominance,
            ))
            .with_context(|| format!("Failed to insert track {:?}", row.id))?;
        }
    }
    tx.commit().context("Failed to commit imported tracks")?;

    debug!("Imported {} row(s)", rows.len());
    Ok(rows.len())
}

/// All stored rows in import order.
pub fn load_rows(conn: &Connection) -> Result<Vec<RawTrack>> {
    let mut stmt = conn
        .prepare(
            "SELECT spotify_id, track, artist, valence, arousal, dominance
             FROM tracks ORDER BY row",
        )
        .context("Failed to prepare track query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawTrack {
                id: row.get(0)?,
                track: row.get(1)?,
                artist: row.get(2)?,
                valence: row.get(3)?,
                arousal: row.get(4)?,
                dominance: row.get(5)?,
            })
        })
        .context("Failed to query tracks")?;

    let tracks = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read track row")?;
    Ok(tracks)
}

pub fn count_rows(conn: &Connection) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))
        .context("Failed to count tracks")?;
    Ok(usize::try_from(count).unwrap_or(0))
}

/// Load the catalog at `path` straight into a [`Corpus`].
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let conn = open_catalog(path)?;
    let rows = load_rows(&conn)?;
    Ok(Corpus::load(rows))
}
