//! # Path Planning
//!
//! Finds the ordered sequence of emotions a listener is walked through on the
//! way from a detected mood to a target mood.
//!
//! ## Selection policy
//!
//! 1. `start == target` yields the one-element path `[start]` (no transition).
//! 2. Breadth-first search collects every path the graph offers to `target`.
//!    The shortest one with at least [`MIN_PATH_LEN`] emotions wins.
//! 3. If the graph only offers a direct hop, the hop is stretched by inserting
//!    the emotion nearest to the midpoint of the two endpoints.
//! 4. If the target is unreachable, a four-emotion path is synthesized from
//!    the emotions nearest to the points one third and two thirds of the way.
//!
//! Planning never fails for any pair of strings.

use crate::affect::{normalize_name, AffectPoint, AffectSpace, NEUTRAL};
use crate::graph::TransitionGraph;
use log::{debug, trace};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Minimum number of emotions on a path that needs a transition (two steps).
pub const MIN_PATH_LEN: usize = 3;

/// Ordered emotions from start to target. Always holds at least one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionPath(Vec<String>);

impl EmotionPath {
    pub(crate) fn from_emotions(emotions: Vec<String>) -> Self {
        debug_assert!(!emotions.is_empty());
        Self(emotions)
    }

    /// The single transition `from → to`, used to realise one journey step.
    #[must_use]
    pub fn segment(from: &str, to: &str) -> Self {
        Self(vec![normalize_name(from), normalize_name(to)])
    }

    #[must_use]
    pub fn start(&self) -> &str {
        &self.0[0]
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.0[self.0.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of transitions (`len - 1`).
    #[must_use]
    pub fn transitions(&self) -> usize {
        self.0.len() - 1
    }

    /// True when start and target differ.
    #[must_use]
    pub fn needs_transition(&self) -> bool {
        self.0.len() > 1
    }

    #[must_use]
    pub fn emotions(&self) -> &[String] {
        &self.0
    }

    /// Consecutive `(from, to)` pairs.
    pub fn segments(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.windows(2).map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for EmotionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" → "))
    }
}

/// Plans emotion paths over an affect space and a transition graph.
#[derive(Debug, Clone, Copy)]
pub struct PathPlanner<'a> {
    space: &'a AffectSpace,
    graph: &'a TransitionGraph,
}

impl Default for PathPlanner<'static> {
    fn default() -> Self {
        Self::new(AffectSpace::global(), TransitionGraph::global())
    }
}

impl<'a> PathPlanner<'a> {
    #[must_use]
    pub const fn new(space: &'a AffectSpace, graph: &'a TransitionGraph) -> Self {
        Self { space, graph }
    }

    #[must_use]
    pub const fn space(&self) -> &'a AffectSpace {
        self.space
    }

    /// Plan the path from `start` to `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use isotune::path::PathPlanner;
    ///
    /// let planner = PathPlanner::default();
    /// assert_eq!(planner.find_path("calm", "CALM ").len(), 1);
    ///
    /// let path = planner.find_path("sad", "happy");
    /// assert_eq!(path.start(), "sad");
    /// assert_eq!(path.target(), "happy");
    /// assert!(path.len() >= 3);
    /// ```
    #[must_use]
    pub fn find_path(&self, start: &str, target: &str) -> EmotionPath {
        let start = normalize_name(start);
        let target = normalize_name(target);

        if start == target {
            return EmotionPath::from_emotions(vec![start]);
        }

        let found = self.search(&start, &target);
        trace!("{} graph path(s) from {start} to {target}", found.len());

        if let Some(path) = found.iter().filter(|p| p.len() >= MIN_PATH_LEN).min_by_key(|p| p.len()) {
            debug!("Graph path {start} → {target}: {} emotions", path.len());
            return EmotionPath::from_emotions(path.clone());
        }

        let emotions = match found.into_iter().min_by_key(Vec::len) {
            Some(shortest) => {
                debug!("Only a direct hop {start} → {target}; inserting a midpoint emotion");
                self.extend(shortest)
            }
            None => {
                debug!("{target} unreachable from {start}; synthesizing intermediates");
                self.synthesize(start, target)
            }
        };

        EmotionPath::from_emotions(emotions)
    }

    /// Breadth-first search returning every discovered path that ends at
    /// `target`. The target itself is never expanded, so no returned path
    /// passes through it twice.
    fn search(&self, start: &str, target: &str) -> Vec<Vec<String>> {
        let mut found = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut queue: VecDeque<(&str, Vec<String>)> = VecDeque::from([(start, vec![start.to_string()])]);

        while let Some((current, path)) = queue.pop_front() {
            for next in self.graph.neighbors_of(current) {
                let mut extended = path.clone();
                extended.push(next.clone());

                if next == target {
                    found.push(extended);
                } else if visited.insert(next.as_str()) {
                    queue.push_back((next.as_str(), extended));
                }
            }
        }

        found
    }

    /// Stretch a too-short path by inserting the emotion nearest to the
    /// midpoint between its endpoints.
    fn extend(&self, path: Vec<String>) -> Vec<String> {
        if path.len() >= MIN_PATH_LEN {
            return path;
        }

        let start = path[0].clone();
        let target = path[path.len() - 1].clone();
        let midpoint = self.point(&start).lerp(self.point(&target), 0.5);
        let middle = self.closest(midpoint, &[&start, &target]);

        vec![start, middle, target]
    }

    /// Four-emotion fallback used when the graph has no route at all.
    fn synthesize(&self, start: String, target: String) -> Vec<String> {
        let from = self.point(&start);
        let to = self.point(&target);

        let first = self.closest(from.lerp(to, 1.0 / 3.0), &[&start, &target]);
        let second = self.closest(from.lerp(to, 2.0 / 3.0), &[&start, &target, &first]);

        vec![start, first, second, target]
    }

    fn point(&self, emotion: &str) -> AffectPoint {
        self.space.coordinates_of(emotion)
    }

    fn closest(&self, point: AffectPoint, exclude: &[&str]) -> String {
        self.space
            .nearest_emotion(point, exclude)
            .unwrap_or(NEUTRAL)
            .to_string()
    }
}

/// Plan a path with the default vocabulary and graph.
#[must_use]
pub fn find_path(start: &str, target: &str) -> EmotionPath {
    PathPlanner::default().find_path(start, target)
}
