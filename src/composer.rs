//! # Playlist Composition
//!
//! Turns an [`EmotionPath`] into concrete tracks. Each transition of the path
//! is split into waypoints placed along a cubic ease-in-out curve in
//! standardized feature space, and every waypoint is realised by a weighted
//! random draw among its nearest unused tracks.
//!
//! ## Sampling
//!
//! For a waypoint `w` and candidate track `c` the score is
//! `-distance(c, w)`, plus `diversity_bonus` once anything has been picked.
//! Scores are shifted so the best candidate sits at zero and then
//! exponentiated, so the closest track is the most likely pick but never a
//! certainty. Every weight lies in `(0, 1]` whatever the score spread.

use crate::affect::AffectSpace;
use crate::config::EngineConfig;
use crate::corpus::{rng_from_seed, Corpus, Track};
use crate::path::EmotionPath;
use log::{debug, trace, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered tracks of one recommendation. Order is the emotional progression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track ids in playlist order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.id.as_str()).collect()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Track> {
        self.tracks
    }
}

impl IntoIterator for Playlist {
    type Item = Track;
    type IntoIter = std::vec::IntoIter<Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.into_iter()
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

/// Slow start, slow finish: `4t³` below one half, `1 - (-2t + 2)³ / 2` above.
#[must_use]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Number of songs for each of `segments` transitions.
///
/// With at least one song per segment the split is even and the last segment
/// takes the remainder. With fewer songs than segments, one song goes to each
/// of `total` evenly spaced segments, always including the first and last.
#[must_use]
pub fn allocate_songs(total: usize, segments: usize) -> Vec<usize> {
    if segments == 0 {
        return Vec::new();
    }

    if total >= segments {
        let base = total / segments;
        let mut counts = vec![base; segments];
        counts[segments - 1] += total - base * segments;
        return counts;
    }

    let mut counts = vec![0; segments];
    match total {
        0 => {}
        1 => counts[0] = 1,
        _ => {
            let (span, steps) = (segments - 1, total - 1);
            for j in 0..total {
                counts[(j * span + steps / 2) / steps] = 1;
            }
        }
    }
    counts
}

/// Builds playlists along emotion paths.
#[derive(Debug, Clone)]
pub struct PlaylistComposer<'a> {
    space: &'a AffectSpace,
    settings: EngineConfig,
}

impl Default for PlaylistComposer<'static> {
    fn default() -> Self {
        Self::new(AffectSpace::global(), EngineConfig::default())
    }
}

impl<'a> PlaylistComposer<'a> {
    #[must_use]
    pub fn new(space: &'a AffectSpace, settings: EngineConfig) -> Self {
        Self { space, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    /// Compose up to `total` tracks along `path`.
    ///
    /// A one-emotion path yields an empty playlist. Waypoints whose
    /// neighbourhood has no unused track are skipped, so the result may be
    /// shorter than `total`; it never holds the same track twice and never
    /// more tracks than the corpus has.
    #[must_use]
    pub fn compose(&self, path: &EmotionPath, total: usize, corpus: &Corpus, seed: Option<u64>) -> Playlist {
        if !path.needs_transition() || total == 0 || corpus.is_empty() {
            return Playlist::default();
        }

        let mut rng = rng_from_seed(seed);
        let mut chosen: HashSet<String> = HashSet::new();
        let mut tracks = Vec::with_capacity(total.min(corpus.len()));
        let k = self.settings.neighbors.min(corpus.len());

        let counts = allocate_songs(total, path.transitions());
        'segments: for ((from, to), count) in path.segments().zip(counts) {
            if count == 0 {
                continue;
            }
            trace!("Segment {from} → {to}: {count} waypoint(s)");

            let start = corpus.feature_point(self.space.coordinates_of(from));
            let end = corpus.feature_point(self.space.coordinates_of(to));

            for waypoint in waypoints(&start, &end, count) {
                if chosen.len() == corpus.len() {
                    debug!("Every track is already in the playlist; stopping early");
                    break 'segments;
                }
                let candidates = corpus.k_nearest(&waypoint, k, &chosen);
                match self.pick(&candidates, !tracks.is_empty(), &mut rng) {
                    Some(track) => {
                        chosen.insert(track.id.clone());
                        tracks.push(track.clone());
                    }
                    None => debug!("No unused track near a {from} → {to} waypoint; skipping"),
                }
            }
        }

        debug!("Composed {} of {total} requested track(s) along {path}", tracks.len());
        Playlist { tracks }
    }

    fn pick<'c>(&self, candidates: &[(&'c Track, f64)], has_picks: bool, rng: &mut StdRng) -> Option<&'c Track> {
        let bonus = if has_picks { self.settings.diversity_bonus } else { 0.0 };
        let scores: Vec<f64> = candidates.iter().map(|(_, d)| -d + bonus).collect();
        let max = scores.iter().copied().reduce(f64::max)?;

        let weights: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();

        match WeightedIndex::new(&weights) {
            Ok(dist) => Some(candidates[dist.sample(rng)].0),
            Err(e) => {
                warn!("Unusable sampling weights ({e}); taking the nearest track");
                candidates.first().map(|(track, _)| *track)
            }
        }
    }
}

/// `count` points from `start` to `end`, eased, endpoints included when
/// `count > 1`. Produced lazily.
fn waypoints<'p>(start: &'p [f64], end: &'p [f64], count: usize) -> impl Iterator<Item = Vec<f64>> + 'p {
    #[allow(clippy::cast_precision_loss)]
    let denom = count.saturating_sub(1).max(1) as f64;

    (0..count).map(move |i| {
        #[allow(clippy::cast_precision_loss)]
        let eased = ease_in_out_cubic(i as f64 / denom);
        start
            .iter()
            .zip(end)
            .map(|(a, b)| a + (b - a) * eased)
            .collect()
    })
}
