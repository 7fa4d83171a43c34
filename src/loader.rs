//! CSV ingestion for song corpora.
//!
//! Column names vary between datasets, so each logical field is resolved from
//! a list of accepted header names (case-insensitive, first match wins). Rows
//! that the CSV parser cannot read are skipped with a warning; value
//! validation is left to [`Corpus::load`](crate::corpus::Corpus::load).

use crate::corpus::RawTrack;
use anyhow::{Context, Result};
use csv::StringRecord;
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

const TRACK_COLUMNS: &[&str] = &["track", "title", "song", "name"];
const ARTIST_COLUMNS: &[&str] = &["artist", "artists", "artist_name"];
const VALENCE_COLUMNS: &[&str] = &["valence_tags", "valence_tag", "valence"];
const AROUSAL_COLUMNS: &[&str] = &["arousal_tags", "arousal_tag", "arousal", "energy"];
const ID_COLUMNS: &[&str] = &["spotify_id", "id", "spotify_uri", "uri"];
const DOMINANCE_COLUMNS: &[&str] = &["dominance_tags", "dominance_tag", "dominance"];

/// Header positions for each logical column, if present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub id: Option<usize>,
    pub track: Option<usize>,
    pub artist: Option<usize>,
    pub valence: Option<usize>,
    pub arousal: Option<usize>,
    pub dominance: Option<usize>,
}

impl ColumnMap {
    /// Resolve logical columns from a header row.
    #[must_use]
    pub fn from_headers(headers: &StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| names.iter().position(|n| n == c))
        };

        Self {
            id: find(ID_COLUMNS),
            track: find(TRACK_COLUMNS),
            artist: find(ARTIST_COLUMNS),
            valence: find(VALENCE_COLUMNS),
            arousal: find(AROUSAL_COLUMNS),
            dominance: find(DOMINANCE_COLUMNS),
        }
    }

    fn extract(&self, record: &StringRecord) -> RawTrack {
        let get = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        RawTrack {
            id: get(self.id),
            track: get(self.track),
            artist: get(self.artist),
            valence: get(self.valence),
            arousal: get(self.arousal),
            dominance: get(self.dominance),
        }
    }
}

/// Read every row of the CSV file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be opened or has no readable header row.
pub fn read_csv(path: &Path) -> Result<Vec<RawTrack>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open corpus CSV at {}", path.display()))?;
    read_csv_from(file).with_context(|| format!("Failed to read corpus CSV {}", path.display()))
}

/// Read every row from any CSV source.
///
/// # Errors
///
/// Fails only when the header row cannot be parsed.
pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<RawTrack>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(reader.headers().context("Missing CSV header row")?);
    debug!("Resolved CSV columns: {columns:?}");

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(columns.extract(&record)),
            Err(e) => warn!("Skipping unreadable CSV record {}: {e}", line + 2),
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternate_column_names_are_coalesced() {
        let data = "Title,Artists,valence,energy,URI\nSong A,Band,0.2,0.8,abc\n";
        let rows = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].track.as_deref(), Some("Song A"));
        assert_eq!(rows[0].artist.as_deref(), Some("Band"));
        assert_eq!(rows[0].arousal.as_deref(), Some("0.8"));
        assert_eq!(rows[0].id.as_deref(), Some("abc"));
        assert!(rows[0].dominance.is_none());
    }

    #[test]
    fn test_preferred_column_wins_over_fallback() {
        let data = "track,artist,valence,valence_tags,arousal,spotify_id\nt,a,0.1,5.5,0.3,x\n";
        let rows = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(rows[0].valence.as_deref(), Some("5.5"));
    }

    #[test]
    fn test_short_records_and_blank_cells_become_none() {
        let data = "track,artist,valence_tags,arousal_tags,dominance_tags,spotify_id\n\
                    Only Title\n\
                    t,a, ,0.4,,id2\n";
        let rows = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].track.as_deref(), Some("Only Title"));
        assert!(rows[0].id.is_none());
        assert!(rows[1].valence.is_none());
        assert!(rows[1].dominance.is_none());
        assert_eq!(rows[1].id.as_deref(), Some("id2"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.csv"));
    }
}
