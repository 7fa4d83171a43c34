//! # Song Corpus
//!
//! Read-only, in-memory collection of tracks placed in the same valence/arousal
//! coordinate system as the [`affect`](crate::affect) vocabulary.
//!
//! ## Loading
//!
//! [`Corpus::load`] accepts loosely-typed rows (strings straight out of a CSV
//! file or the SQLite catalog) and:
//!
//! 1. coerces valence, arousal and the optional dominance value to numbers,
//! 2. drops rows without an id or with unparseable valence/arousal,
//! 3. rescales valence and arousal onto `[-1, 1]` (see [`rescale_to_unit_range`]),
//! 4. deduplicates by id, keeping the first occurrence.
//!
//! Feature standardization (zero mean, unit variance per feature) is computed
//! once during loading and reused by every nearest-neighbour query, so a
//! loaded corpus can be shared across threads without further locking.

use crate::affect::AffectPoint;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Columns a corpus needs before it can serve recommendations.
pub const REQUIRED_COLUMNS: [&str; 5] = ["spotify_id", "track", "artist", "valence", "arousal"];

/// Source range treated as "already normalised" and left untouched.
const LOOSE_BOUND: f64 = 1.2;

/// One unvalidated row as delivered by a loader. Every field is optional
/// text; numeric coercion happens in [`Corpus::load`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrack {
    pub id: Option<String>,
    pub track: Option<String>,
    pub artist: Option<String>,
    pub valence: Option<String>,
    pub arousal: Option<String>,
    pub dominance: Option<String>,
}

impl RawTrack {
    /// Convenience constructor for rows whose values are already numeric.
    #[must_use]
    pub fn from_values(id: &str, track: &str, artist: &str, valence: f64, arousal: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            track: Some(track.to_string()),
            artist: Some(artist.to_string()),
            valence: Some(valence.to_string()),
            arousal: Some(arousal.to_string()),
            dominance: None,
        }
    }

    #[must_use]
    pub fn with_dominance(mut self, dominance: f64) -> Self {
        self.dominance = Some(dominance.to_string());
        self
    }
}

/// A validated, normalised track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "spotify_id")]
    pub id: String,
    pub track: String,
    pub artist: String,
    pub valence: f64,
    pub arousal: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dominance: Option<f64>,
}

impl Track {
    #[must_use]
    pub fn affect(&self) -> AffectPoint {
        AffectPoint::new(self.valence, self.arousal)
    }
}

/// Which rescaling [`rescale_to_unit_range`] applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rescale {
    /// Values were constant, empty, or already within roughly `[-1, 1]`.
    Unchanged,
    /// Values lay within `[0, 1]` and were mapped through `2x - 1`.
    FromUnitInterval,
    /// Values were min-max rescaled onto `[-1, 1]`.
    MinMax,
}

/// Bring `values` onto `[-1, 1]` in place.
///
/// - within `[0, 1]`: `2x - 1`
/// - within `[-1.2, 1.2]`: unchanged
/// - anything else: min-max rescaling
///
/// Constant or empty input is left unchanged.
pub fn rescale_to_unit_range(values: &mut [f64]) -> Rescale {
    let Some((min, max)) = min_max(values) else {
        return Rescale::Unchanged;
    };
    if max == min {
        return Rescale::Unchanged;
    }

    if min >= 0.0 && max <= 1.0 {
        values.iter_mut().for_each(|v| *v = 2.0 * *v - 1.0);
        Rescale::FromUnitInterval
    } else if min >= -LOOSE_BOUND && max <= LOOSE_BOUND {
        Rescale::Unchanged
    } else {
        min_max_rescale(values, min, max);
        Rescale::MinMax
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn min_max_rescale(values: &mut [f64], min: f64, max: f64) {
    let span = max - min;
    values
        .iter_mut()
        .for_each(|v| *v = 2.0 * ((*v - min) / span) - 1.0);
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(match sorted.len() % 2 {
        0 => (sorted[mid - 1] + sorted[mid]) / 2.0,
        _ => sorted[mid],
    })
}

/// Parse a numeric field, rejecting blanks, garbage and non-finite values.
fn parse_number(field: Option<&String>) -> Option<f64> {
    field
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn non_blank(field: Option<&String>) -> Option<String> {
    field
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Per-feature standardization: `(x - mean) / std`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl FeatureScaler {
    /// Fit on `rows`, each of length `dims`. Population standard deviation;
    /// a feature with zero deviation gets a scale of 1.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>], dims: usize) -> Self {
        if rows.is_empty() {
            return Self::identity(dims);
        }
        #[allow(clippy::cast_precision_loss)]
        let n = rows.len() as f64;

        let mean: Vec<f64> = (0..dims)
            .map(|d| rows.iter().map(|r| r[d]).sum::<f64>() / n)
            .collect();
        let scale = (0..dims)
            .map(|d| {
                let var = rows.iter().map(|r| (r[d] - mean[d]).powi(2)).sum::<f64>() / n;
                match var.sqrt() {
                    s if s > f64::EPSILON => s,
                    _ => 1.0,
                }
            })
            .collect();

        Self { mean, scale }
    }

    #[must_use]
    pub fn identity(dims: usize) -> Self {
        Self {
            mean: vec![0.0; dims],
            scale: vec![1.0; dims],
        }
    }

    #[must_use]
    pub fn transform(&self, raw: &[f64]) -> Vec<f64> {
        raw.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }

    #[must_use]
    pub fn dims(&self) -> usize {
        self.mean.len()
    }
}

/// Euclidean distance between two feature vectors of equal length.
#[must_use]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// RNG for one request: seeded when `seed` is given, otherwise from entropy.
#[must_use]
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Loaded song corpus.
#[derive(Debug, Clone)]
pub struct Corpus {
    tracks: Vec<Track>,
    /// Standardized feature vectors, parallel to `tracks`.
    features: Vec<Vec<f64>>,
    scaler: FeatureScaler,
    missing: Vec<&'static str>,
    has_dominance: bool,
}

impl Corpus {
    /// Build a corpus from raw rows. Never fails: bad rows are dropped and
    /// logged.
    pub fn load<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RawTrack>,
    {
        let rows: Vec<RawTrack> = rows.into_iter().collect();
        let missing = missing_columns(&rows);
        let total = rows.len();

        let mut valid: Vec<(String, String, String, f64, f64, Option<f64>)> = rows
            .iter()
            .filter_map(|row| {
                let id = non_blank(row.id.as_ref())?;
                let valence = parse_number(row.valence.as_ref())?;
                let arousal = parse_number(row.arousal.as_ref())?;
                Some((
                    id,
                    row.track.clone().unwrap_or_default(),
                    row.artist.clone().unwrap_or_default(),
                    valence,
                    arousal,
                    parse_number(row.dominance.as_ref()),
                ))
            })
            .collect();

        let dropped = total - valid.len();
        if dropped > 0 {
            debug!("Dropped {dropped} row(s) with missing id or non-numeric valence/arousal");
        }

        let mut valences: Vec<f64> = valid.iter().map(|r| r.3).collect();
        let mut arousals: Vec<f64> = valid.iter().map(|r| r.4).collect();
        let v_rescale = rescale_to_unit_range(&mut valences);
        let a_rescale = rescale_to_unit_range(&mut arousals);
        debug!("Valence rescale: {v_rescale:?}, arousal rescale: {a_rescale:?}");

        let dominance = normalize_dominance(valid.iter().map(|r| r.5).collect());
        let has_dominance = dominance.is_some();

        for (i, row) in valid.iter_mut().enumerate() {
            row.3 = valences[i];
            row.4 = arousals[i];
            row.5 = dominance.as_ref().map(|d| d[i]);
        }

        let mut seen = HashSet::with_capacity(valid.len());
        let tracks: Vec<Track> = valid
            .into_iter()
            .filter(|row| seen.insert(row.0.clone()))
            .map(|(id, track, artist, valence, arousal, dominance)| Track {
                id,
                track,
                artist,
                valence,
                arousal,
                dominance,
            })
            .collect();

        let dims = if has_dominance { 3 } else { 2 };
        let raw_features: Vec<Vec<f64>> = tracks.iter().map(|t| raw_features(t, dims)).collect();
        let scaler = FeatureScaler::fit(&raw_features, dims);
        let features = raw_features.iter().map(|f| scaler.transform(f)).collect();

        info!(
            "Corpus loaded: {} track(s) from {total} row(s), {dims} feature(s)",
            tracks.len()
        );
        if !missing.is_empty() {
            warn!("Corpus is missing column(s): {}", missing.join(", "));
        }

        Self {
            tracks,
            features,
            scaler,
            missing,
            has_dominance,
        }
    }

    /// True when the corpus holds at least one track and every required
    /// column was supplied.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.tracks.is_empty() && self.missing.is_empty()
    }

    /// Required columns absent from the source rows.
    #[must_use]
    pub fn missing_columns(&self) -> &[&'static str] {
        &self.missing
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn has_dominance(&self) -> bool {
        self.has_dominance
    }

    /// Number of features used for similarity (2, or 3 with dominance).
    #[must_use]
    pub fn dims(&self) -> usize {
        self.scaler.dims()
    }

    /// Lift an affect point into standardized feature space. The dominance
    /// coordinate, when present, is taken as 0.
    #[must_use]
    pub fn feature_point(&self, point: AffectPoint) -> Vec<f64> {
        let mut raw = vec![point.valence, point.arousal];
        raw.resize(self.dims(), 0.0);
        self.scaler.transform(&raw)
    }

    /// Tracks whose valence and arousal fall within the inclusive ranges,
    /// minus `exclude`. When more than `limit` match, a reproducible random
    /// sample of `limit` is returned.
    #[must_use]
    pub fn query(
        &self,
        valence: RangeInclusive<f64>,
        arousal: RangeInclusive<f64>,
        exclude: &HashSet<String>,
        limit: usize,
        seed: Option<u64>,
    ) -> Vec<&Track> {
        let matches: Vec<&Track> = self
            .tracks
            .iter()
            .filter(|t| valence.contains(&t.valence) && arousal.contains(&t.arousal))
            .filter(|t| !exclude.contains(&t.id))
            .collect();

        if matches.len() <= limit {
            return matches;
        }

        let mut rng = rng_from_seed(seed);
        matches.choose_multiple(&mut rng, limit).copied().collect()
    }

    /// The `k` tracks nearest to `point` (standardized feature space), with
    /// their distances, nearest first. Ties keep corpus order.
    #[must_use]
    pub fn k_nearest(&self, point: &[f64], k: usize, exclude: &HashSet<String>) -> Vec<(&Track, f64)> {
        if k == 0 {
            return Vec::new();
        }
        if point.len() != self.dims() {
            warn!(
                "Query point has {} feature(s), corpus has {}",
                point.len(),
                self.dims()
            );
            return Vec::new();
        }

        let mut candidates: Vec<(&Track, f64)> = self
            .tracks
            .par_iter()
            .zip(self.features.par_iter())
            .filter(|(track, _)| !exclude.contains(&track.id))
            .map(|(track, features)| (track, euclidean(features, point)))
            .collect();

        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        candidates.truncate(k);
        candidates
    }
}

fn raw_features(track: &Track, dims: usize) -> Vec<f64> {
    let mut raw = vec![track.valence, track.arousal];
    if dims > 2 {
        raw.push(track.dominance.unwrap_or(0.0));
    }
    raw
}

/// Fill gaps with the median, then min-max onto `[-1, 1]`. `None` when no
/// row carries a dominance value at all.
fn normalize_dominance(values: Vec<Option<f64>>) -> Option<Vec<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let fill = median(&present)?;

    let mut filled: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(fill)).collect();
    if let Some((min, max)) = min_max(&filled) {
        if max > min {
            min_max_rescale(&mut filled, min, max);
        }
    }
    Some(filled)
}

fn missing_columns(rows: &[RawTrack]) -> Vec<&'static str> {
    let supplied = |field: fn(&RawTrack) -> Option<&String>| {
        rows.iter().any(|row| non_blank(field(row)).is_some())
    };

    let checks: [(&'static str, fn(&RawTrack) -> Option<&String>); 5] = [
        ("spotify_id", |r| r.id.as_ref()),
        ("track", |r| r.track.as_ref()),
        ("artist", |r| r.artist.as_ref()),
        ("valence", |r| r.valence.as_ref()),
        ("arousal", |r| r.arousal.as_ref()),
    ];

    checks
        .into_iter()
        .filter(|(_, field)| !supplied(*field))
        .map(|(name, _)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, valence: f64, arousal: f64) -> RawTrack {
        RawTrack::from_values(id, &format!("Track {id}"), "Artist", valence, arousal)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_values_already_in_range_are_unchanged() {
        let corpus = Corpus::load(vec![row("a", -0.9, 0.4), row("b", 0.25, -0.75), row("c", 0.0, 0.1)]);
        assert_close(corpus.tracks()[0].valence, -0.9);
        assert_close(corpus.tracks()[1].arousal, -0.75);
        assert_close(corpus.tracks()[2].arousal, 0.1);
    }

    #[test]
    fn test_unit_interval_maps_linearly() {
        let corpus = Corpus::load(vec![row("a", 0.0, 1.0), row("b", 1.0, 0.0), row("c", 0.5, 0.25)]);
        assert_close(corpus.get("a").unwrap().valence, -1.0);
        assert_close(corpus.get("a").unwrap().arousal, 1.0);
        assert_close(corpus.get("b").unwrap().valence, 1.0);
        assert_close(corpus.get("c").unwrap().valence, 0.0);
        assert_close(corpus.get("c").unwrap().arousal, -0.5);
    }

    #[test]
    fn test_wide_range_is_min_max_rescaled() {
        let mut values = vec![1.0, 5.5, 10.0];
        assert_eq!(rescale_to_unit_range(&mut values), Rescale::MinMax);
        assert_close(values[0], -1.0);
        assert_close(values[1], 0.0);
        assert_close(values[2], 1.0);
    }

    #[test]
    fn test_loose_range_is_left_as_is() {
        let mut values = vec![-1.1, 0.3, 1.15];
        assert_eq!(rescale_to_unit_range(&mut values), Rescale::Unchanged);
        assert_eq!(values, vec![-1.1, 0.3, 1.15]);
    }

    #[test]
    fn test_constant_column_is_untouched() {
        let mut values = vec![7.0, 7.0];
        assert_eq!(rescale_to_unit_range(&mut values), Rescale::Unchanged);
        assert_eq!(values, vec![7.0, 7.0]);
    }

    #[test]
    fn test_invalid_rows_dropped_and_duplicates_collapsed() {
        let mut bad_valence = row("x", 0.0, 0.0);
        bad_valence.valence = Some("not-a-number".to_string());
        let mut no_id = row("", 0.1, 0.1);
        no_id.id = Some("   ".to_string());
        let mut infinite = row("inf", 0.0, 0.0);
        infinite.arousal = Some("inf".to_string());

        let corpus = Corpus::load(vec![
            row("a", -0.5, 0.5),
            bad_valence,
            no_id,
            infinite,
            row("a", 0.9, 0.9),
            row("b", 0.2, -0.2),
        ]);

        assert_eq!(corpus.len(), 2);
        assert_close(corpus.get("a").unwrap().valence, -0.5);
        assert!(corpus.is_ready());
    }

    #[test]
    fn test_missing_metadata_column_means_not_ready() {
        let rows = vec![RawTrack {
            id: Some("a".to_string()),
            valence: Some("0.1".to_string()),
            arousal: Some("0.2".to_string()),
            ..RawTrack::default()
        }];
        let corpus = Corpus::load(rows);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.missing_columns(), ["track", "artist"]);
        assert!(!corpus.is_ready());
    }

    #[test]
    fn test_empty_corpus_not_ready() {
        let corpus = Corpus::load(Vec::new());
        assert!(!corpus.is_ready());
        assert!(corpus.k_nearest(&[0.0, 0.0], 5, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_dominance_filled_with_median_and_rescaled() {
        let corpus = Corpus::load(vec![
            row("a", 0.1, 0.1).with_dominance(2.0),
            row("b", 0.2, 0.2).with_dominance(6.0),
            row("c", 0.3, 0.3),
            row("d", 0.4, 0.4).with_dominance(4.0),
        ]);
        assert!(corpus.has_dominance());
        assert_eq!(corpus.dims(), 3);
        assert_close(corpus.get("a").unwrap().dominance.unwrap(), -1.0);
        assert_close(corpus.get("b").unwrap().dominance.unwrap(), 1.0);
        assert_close(corpus.get("c").unwrap().dominance.unwrap(), 0.0);
    }

    #[test]
    fn test_standardized_features_have_zero_mean_unit_variance() {
        let rows: Vec<RawTrack> = (0..10)
            .map(|i| row(&i.to_string(), f64::from(i) / 10.0 - 0.5, 0.8 - f64::from(i) / 20.0))
            .collect();
        let corpus = Corpus::load(rows);

        for d in 0..corpus.dims() {
            let column: Vec<f64> = corpus.features.iter().map(|f| f[d]).collect();
            let mean = column.iter().sum::<f64>() / column.len() as f64;
            let var = column.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / column.len() as f64;
            assert_close(mean, 0.0);
            assert_close(var, 1.0);
        }
    }

    #[test]
    fn test_query_respects_ranges_exclusions_and_limit() {
        let corpus = Corpus::load(vec![
            row("a", 0.1, 0.1),
            row("b", 0.2, 0.2),
            row("c", 0.3, 0.3),
            row("d", -0.9, -0.9),
        ]);
        let exclude: HashSet<String> = HashSet::from(["b".to_string()]);

        let hits = corpus.query(0.0..=0.3, 0.0..=0.3, &exclude, 10, Some(1));
        let ids: Vec<&str> = hits.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let limited = corpus.query(-1.0..=1.0, -1.0..=1.0, &HashSet::new(), 2, Some(7));
        assert_eq!(limited.len(), 2);
        let again = corpus.query(-1.0..=1.0, -1.0..=1.0, &HashSet::new(), 2, Some(7));
        assert_eq!(limited, again, "Same seed must sample the same tracks");
    }

    #[test]
    fn test_k_nearest_orders_by_distance_and_excludes() {
        let corpus = Corpus::load(vec![
            row("far", 0.9, 0.9),
            row("near", -0.1, 0.0),
            row("mid", 0.4, 0.4),
            row("other", -0.8, -0.9),
        ]);
        let origin = corpus.feature_point(AffectPoint::new(-0.1, 0.0));

        let hits = corpus.k_nearest(&origin, 2, &HashSet::new());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0.id, "near");
        assert!(hits[0].1 <= hits[1].1);

        let exclude: HashSet<String> = HashSet::from(["near".to_string()]);
        let hits = corpus.k_nearest(&origin, 10, &exclude);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|(t, _)| t.id != "near"));
    }

    #[test]
    fn test_k_nearest_rejects_wrong_dimensions() {
        let corpus = Corpus::load(vec![row("a", 0.1, 0.1), row("b", 0.5, 0.5)]);
        assert!(corpus.k_nearest(&[0.0, 0.0, 0.0], 1, &HashSet::new()).is_empty());
    }
}
