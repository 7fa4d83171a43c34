//! # Recommender
//!
//! Single entry point tying path planning and playlist composition together.
//!
//! The outcome is a tagged [`Recommendation`] so callers can tell "the corpus
//! cannot be used", "nothing to do" and "nothing matched" apart.
//! [`Recommendation::into_playlist`] collapses it back to a plain, possibly
//! empty, playlist for callers that only want tracks.
//!
//! ```
//! use isotune::corpus::{Corpus, RawTrack};
//! use isotune::recommender::{Recommendation, Recommender};
//!
//! let corpus = Corpus::load(vec![
//!     RawTrack::from_values("a", "Storm", "Band", -0.6, 0.7),
//!     RawTrack::from_values("b", "Drift", "Band", 0.7, -0.7),
//! ]);
//! let recommender = Recommender::default();
//!
//! let outcome = recommender.recommend(&corpus, "calm", "calm", 5, Some(42));
//! assert_eq!(outcome, Recommendation::AlreadyAtTarget);
//!
//! let playlist = recommender.recommend(&corpus, "angry", "calm", 2, Some(42)).into_playlist();
//! assert_eq!(playlist.len(), 2);
//! ```

use crate::affect::AffectSpace;
use crate::composer::{Playlist, PlaylistComposer};
use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::graph::TransitionGraph;
use crate::journey::Journey;
use crate::path::{EmotionPath, PathPlanner};
use log::{debug, info};
use serde::Serialize;

/// Outcome of a recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "tracks", rename_all = "snake_case")]
pub enum Recommendation {
    /// Tracks in emotional order. Never empty.
    Ready(Playlist),
    /// Start and target are the same emotion.
    AlreadyAtTarget,
    /// The corpus is empty or lacks a required column.
    CorpusNotReady,
    /// A transition was needed but no track could be selected.
    NoSongsFound,
}

impl Recommendation {
    #[must_use]
    pub fn playlist(&self) -> Option<&Playlist> {
        match self {
            Self::Ready(playlist) => Some(playlist),
            _ => None,
        }
    }

    /// The tracks, or an empty playlist for every other outcome.
    #[must_use]
    pub fn into_playlist(self) -> Playlist {
        match self {
            Self::Ready(playlist) => playlist,
            _ => Playlist::default(),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Plans and realises mood transitions over one vocabulary and graph.
#[derive(Debug, Clone)]
pub struct Recommender<'a> {
    planner: PathPlanner<'a>,
    composer: PlaylistComposer<'a>,
}

impl Default for Recommender<'static> {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl Recommender<'static> {
    /// Default vocabulary and graph with custom tuning.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(AffectSpace::global(), TransitionGraph::global(), config)
    }
}

impl<'a> Recommender<'a> {
    #[must_use]
    pub fn new(space: &'a AffectSpace, graph: &'a TransitionGraph, config: EngineConfig) -> Self {
        Self {
            planner: PathPlanner::new(space, graph),
            composer: PlaylistComposer::new(space, config),
        }
    }

    #[must_use]
    pub fn planner(&self) -> &PathPlanner<'a> {
        &self.planner
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.composer.settings()
    }

    /// Recommend up to `total` tracks leading from `start` to `target`.
    #[must_use]
    pub fn recommend(
        &self,
        corpus: &Corpus,
        start: &str,
        target: &str,
        total: usize,
        seed: Option<u64>,
    ) -> Recommendation {
        let path = self.planner.find_path(start, target);
        self.recommend_path(corpus, &path, total, seed)
    }

    /// Recommend along an already planned `path`, so callers that show the
    /// route do not plan it twice.
    #[must_use]
    pub fn recommend_path(&self, corpus: &Corpus, path: &EmotionPath, total: usize, seed: Option<u64>) -> Recommendation {
        if !corpus.is_ready() {
            debug!("Corpus not ready; missing {:?}", corpus.missing_columns());
            return Recommendation::CorpusNotReady;
        }

        self.realize(corpus, path, total, seed)
    }

    /// Recommend tracks for the current transition of `journey` only.
    #[must_use]
    pub fn recommend_step(&self, corpus: &Corpus, journey: &Journey, total: usize, seed: Option<u64>) -> Recommendation {
        if !corpus.is_ready() {
            return Recommendation::CorpusNotReady;
        }

        match journey.current_transition() {
            Some((from, to)) => {
                info!(
                    "Journey step {} of {}: {from} → {to}",
                    journey.current_step() + 1,
                    journey.total_steps()
                );
                self.realize(corpus, &EmotionPath::segment(from, to), total, seed)
            }
            None => Recommendation::AlreadyAtTarget,
        }
    }

    fn realize(&self, corpus: &Corpus, path: &EmotionPath, total: usize, seed: Option<u64>) -> Recommendation {
        if !path.needs_transition() {
            return Recommendation::AlreadyAtTarget;
        }

        let playlist = self.composer.compose(path, total, corpus, seed);
        if playlist.is_empty() {
            Recommendation::NoSongsFound
        } else {
            Recommendation::Ready(playlist)
        }
    }
}

/// Flat form of [`Recommender::recommend`] with the default vocabulary:
/// every non-ready outcome is an empty playlist.
#[must_use]
pub fn recommend(corpus: &Corpus, start: &str, target: &str, total: usize, seed: Option<u64>) -> Playlist {
    Recommender::default()
        .recommend(corpus, start, target, total, seed)
        .into_playlist()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::RawTrack;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn uniform_corpus(n: usize, seed: u64) -> Corpus {
        let mut rng = StdRng::seed_from_u64(seed);
        Corpus::load((0..n).map(|i| {
            RawTrack::from_values(
                &format!("song-{i}"),
                &format!("Song {i}"),
                "Synthetic",
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            )
        }))
    }

    #[test]
    fn test_same_mood_is_already_at_target() {
        let corpus = uniform_corpus(40, 1);
        assert_eq!(
            Recommender::default().recommend(&corpus, "calm", "calm", 5, Some(42)),
            Recommendation::AlreadyAtTarget
        );
        assert!(recommend(&corpus, "calm", "calm", 5, Some(42)).is_empty());
    }

    #[test]
    fn test_unready_corpus_is_reported_first() {
        let corpus = Corpus::load(Vec::new());
        assert_eq!(
            Recommender::default().recommend(&corpus, "calm", "calm", 5, Some(1)),
            Recommendation::CorpusNotReady
        );
    }

    #[test]
    fn test_identical_seed_gives_identical_playlist() {
        let corpus = uniform_corpus(150, 9);
        let first = recommend(&corpus, "sad", "happy", 8, Some(2024));
        let second = recommend(&corpus, "sad", "happy", 8, Some(2024));
        assert_eq!(first.ids(), second.ids());
        assert_eq!(first.len(), 8);
    }

    #[test]
    fn test_angry_to_calm_moves_toward_calm() {
        let corpus = uniform_corpus(200, 7);
        let playlist = recommend(&corpus, "angry", "calm", 6, Some(1));
        assert_eq!(playlist.len(), 6);

        let first = &playlist.tracks()[0];
        let last = &playlist.tracks()[5];
        assert!(first.valence < last.valence, "valence should rise");
        assert!(first.arousal > last.arousal, "arousal should fall");
    }

    #[test]
    fn test_two_track_corpus_never_repeats() {
        let corpus = Corpus::load(vec![
            RawTrack::from_values("one", "One", "A", -0.2, 0.3),
            RawTrack::from_values("two", "Two", "B", 0.4, -0.1),
        ]);
        let playlist = recommend(&corpus, "sad", "happy", 10, Some(3));
        assert!(playlist.len() <= 2);
        let unique: HashSet<&str> = playlist.ids().into_iter().collect();
        assert_eq!(unique.len(), playlist.len());
    }

    #[test]
    fn test_step_recommendation_covers_single_transition() {
        let corpus = uniform_corpus(100, 5);
        let recommender = Recommender::default();
        let journey = Journey::plan(recommender.planner(), "sad", "calm").with_step(1);

        let outcome = recommender.recommend_step(&corpus, &journey, 4, Some(8));
        assert_eq!(outcome.playlist().map(Playlist::len), Some(4));

        let same_mood = Journey::plan(recommender.planner(), "happy", "happy");
        assert_eq!(
            recommender.recommend_step(&corpus, &same_mood, 4, Some(8)),
            Recommendation::AlreadyAtTarget
        );
    }

    #[test]
    fn test_custom_config_is_used() {
        let config = EngineConfig {
            neighbors: 1,
            ..EngineConfig::default()
        };
        let recommender = Recommender::with_config(config);
        assert_eq!(recommender.config().neighbors, 1);

        // k = 1 makes every pick the nearest unused track, so any seed agrees
        let corpus = uniform_corpus(80, 6);
        let a = recommender.recommend(&corpus, "tense", "content", 5, Some(1));
        let b = recommender.recommend(&corpus, "tense", "content", 5, Some(777));
        assert_eq!(a, b);
    }

    #[test]
    fn test_planned_path_matches_direct_recommendation() {
        let corpus = uniform_corpus(120, 10);
        let recommender = Recommender::default();
        let path = recommender.planner().find_path("fearful", "relaxed");

        assert_eq!(
            recommender.recommend_path(&corpus, &path, 6, Some(4)),
            recommender.recommend(&corpus, "fearful", "relaxed", 6, Some(4))
        );
        assert_eq!(
            recommender.recommend_path(&Corpus::load(Vec::new()), &path, 6, Some(4)),
            Recommendation::CorpusNotReady
        );
    }

    #[test]
    fn test_huge_request_returns_whole_corpus_at_most() {
        let corpus = uniform_corpus(40, 13);
        let playlist = recommend(&corpus, "angry", "calm", usize::MAX, Some(1));
        assert!(playlist.len() <= 40);
        assert!(!playlist.is_empty());
    }
}
