//! # Transition Graph
//!
//! Directed graph of one-step emotional shifts. The table is deliberately
//! sparse and mostly one-directional so that journeys are routed through a
//! handful of plausible intermediate states instead of jumping from an
//! extreme negative feeling straight to an extreme positive one:
//!
//! ```text
//! sad     → melancholic → somber → neutral | content
//! angry   → irritated → tense → uneasy | anxious
//! neutral → content | hopeful | focused        (hub)
//! content → serene → peaceful → calm
//! hopeful | cheerful → happy
//! ```
//!
//! Looking up an emotion that has no row yields an empty neighbour list,
//! never an error.

use crate::affect::{normalize_name, AffectPoint};
use std::collections::HashMap;

/// Default adjacency, in table order. Neighbour order is the order BFS
/// explores successors in.
const DEFAULT_TRANSITIONS: &[(&str, &[&str])] = &[
    // Sad pathway
    ("sad", &["melancholic"]),
    ("melancholic", &["somber"]),
    ("somber", &["neutral", "content"]),
    // Angry pathway
    ("angry", &["irritated"]),
    ("irritated", &["tense"]),
    ("tense", &["uneasy", "anxious"]),
    // Fear / anxious pathway
    ("fearful", &["anxious"]),
    ("fear", &["anxious"]),
    ("anxious", &["uneasy"]),
    ("uneasy", &["neutral", "content"]),
    // Surprise pathway
    ("surprised", &["hopeful"]),
    ("surprise", &["hopeful"]),
    ("hopeful", &["neutral", "cheerful"]),
    // Hub
    ("neutral", &["content", "hopeful", "focused"]),
    // Positive, low-arousal progression
    ("content", &["serene", "hopeful"]),
    ("serene", &["peaceful"]),
    ("peaceful", &["calm"]),
    ("calm", &["relaxed", "peaceful"]),
    ("relaxed", &["calm", "content"]),
    ("focused", &["content", "cheerful"]),
    // Positive, high-arousal convergence
    ("cheerful", &["happy", "energized"]),
    ("energized", &["happy", "cheerful"]),
    ("happy", &["energized", "loving"]),
    ("loving", &["happy", "content"]),
];

lazy_static::lazy_static! {
    static ref DEFAULT_GRAPH: TransitionGraph = TransitionGraph::from_table(DEFAULT_TRANSITIONS);
}

/// Immutable adjacency list over emotion names.
#[derive(Debug, Clone)]
pub struct TransitionGraph {
    /// Source emotions in table order.
    order: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl TransitionGraph {
    /// Build a graph from `(source, [targets])` rows. Names are normalised,
    /// duplicate targets within a row are dropped and a repeated source row
    /// is ignored.
    #[must_use]
    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        let mut order = Vec::with_capacity(table.len());
        let mut edges = HashMap::with_capacity(table.len());

        for &(source, targets) in table {
            let key = normalize_name(source);
            if edges.contains_key(&key) {
                continue;
            }
            let mut row: Vec<String> = Vec::with_capacity(targets.len());
            for target in targets.iter().map(|t| normalize_name(t)) {
                if !row.contains(&target) {
                    row.push(target);
                }
            }
            order.push(key.clone());
            edges.insert(key, row);
        }

        Self { order, edges }
    }

    /// The curated default graph.
    #[must_use]
    pub fn global() -> &'static Self {
        &DEFAULT_GRAPH
    }

    /// Emotions reachable from `emotion` in one step, possibly empty.
    #[must_use]
    pub fn neighbors_of(&self, emotion: &str) -> &[String] {
        self.edges
            .get(&normalize_name(emotion))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Source emotions with their neighbour lists, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.order
            .iter()
            .map(|source| (source.as_str(), self.neighbors_of(source)))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn source_count(&self) -> usize {
        self.order.len()
    }
}

impl Default for TransitionGraph {
    fn default() -> Self {
        Self::from_table(DEFAULT_TRANSITIONS)
    }
}

/// Coarse grouping of emotions by valence, used when printing the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValenceBand {
    Negative,
    Neutral,
    Positive,
}

/// Band for a point: negative below -0.2, positive above 0.2.
#[must_use]
pub fn valence_band(point: AffectPoint) -> ValenceBand {
    match point.valence {
        v if v < -0.2 => ValenceBand::Negative,
        v if v > 0.2 => ValenceBand::Positive,
        _ => ValenceBand::Neutral,
    }
}

/// Shape statistics for a transition graph
pub mod statistics {
    use super::TransitionGraph;
    use std::collections::HashMap;

    /// Summary of how connected a graph is.
    #[derive(Debug, Clone, PartialEq)]
    pub struct GraphStatistics {
        pub emotion_count: usize,
        pub edge_count: usize,
        pub mean_out_degree: f64,
        /// Most reachable states, by incoming edge count (descending).
        pub hubs: Vec<(String, usize)>,
        /// Most flexible states, by outgoing edge count (descending).
        pub gateways: Vec<(String, usize)>,
        /// Emotions that appear only as targets and have no row of their own.
        pub dead_ends: Vec<String>,
    }

    /// Summarise `graph`, keeping the `top` best hubs and gateways.
    #[must_use]
    pub fn summarize(graph: &TransitionGraph, top: usize) -> GraphStatistics {
        let mut incoming: HashMap<&str, usize> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();

        for (_, targets) in graph.iter() {
            for target in targets {
                let count = incoming.entry(target.as_str()).or_insert(0);
                if *count == 0 {
                    first_seen.push(target.as_str());
                }
                *count += 1;
            }
        }

        // Stable sorts keep table order among equal counts.
        let mut hubs: Vec<(String, usize)> = first_seen
            .iter()
            .map(|name| ((*name).to_string(), incoming[name]))
            .collect();
        hubs.sort_by(|a, b| b.1.cmp(&a.1));
        hubs.truncate(top);

        let mut gateways: Vec<(String, usize)> = graph
            .iter()
            .map(|(source, targets)| (source.to_string(), targets.len()))
            .collect();
        gateways.sort_by(|a, b| b.1.cmp(&a.1));
        gateways.truncate(top);

        let dead_ends = first_seen
            .iter()
            .filter(|name| graph.neighbors_of(name).is_empty())
            .map(|name| (*name).to_string())
            .collect();

        let emotion_count = graph.source_count();
        let edge_count = graph.edge_count();
        #[allow(clippy::cast_precision_loss)]
        let mean_out_degree = match emotion_count {
            0 => 0.0,
            n => edge_count as f64 / n as f64,
        };

        GraphStatistics {
            emotion_count,
            edge_count,
            mean_out_degree,
            hubs,
            gateways,
            dead_ends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affect::AffectSpace;

    #[test]
    fn test_unknown_emotion_has_no_neighbors() {
        assert!(TransitionGraph::global().neighbors_of("bewildered").is_empty());
    }

    #[test]
    fn test_neighbors_preserve_table_order() {
        let graph = TransitionGraph::global();
        assert_eq!(graph.neighbors_of("neutral"), ["content", "hopeful", "focused"]);
        assert_eq!(graph.neighbors_of("  TENSE "), ["uneasy", "anxious"]);
    }

    #[test]
    fn test_every_graph_emotion_has_coordinates() {
        let space = AffectSpace::global();
        for (source, targets) in TransitionGraph::global().iter() {
            assert!(space.contains(source), "{source} missing from affect space");
            for target in targets {
                assert!(space.contains(target), "{target} missing from affect space");
            }
        }
    }

    #[test]
    fn test_duplicate_rows_and_targets_are_collapsed() {
        let graph = TransitionGraph::from_table(&[
            ("a", &["b", "b", "c"]),
            ("A", &["z"]),
        ]);
        assert_eq!(graph.neighbors_of("a"), ["b", "c"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_valence_bands() {
        assert_eq!(valence_band(AffectPoint::new(-0.7, 0.0)), ValenceBand::Negative);
        assert_eq!(valence_band(AffectPoint::new(0.2, 0.9)), ValenceBand::Neutral);
        assert_eq!(valence_band(AffectPoint::new(0.21, -0.9)), ValenceBand::Positive);
    }

    #[test]
    fn test_statistics_for_default_graph() {
        let stats = statistics::summarize(TransitionGraph::global(), 5);
        assert_eq!(stats.emotion_count, 24);
        assert_eq!(stats.edge_count, TransitionGraph::global().edge_count());
        assert!(stats.mean_out_degree > 1.0);
        assert_eq!(stats.hubs.len(), 5);
        // content is targeted from somber, uneasy, neutral, relaxed, focused, loving
        assert_eq!(stats.hubs[0], ("content".to_string(), 6));
        assert!(stats.dead_ends.is_empty(), "Every target has its own row");
    }

    #[test]
    fn test_statistics_report_dead_ends() {
        let graph = TransitionGraph::from_table(&[("a", &["b"]), ("b", &["c"])]);
        let stats = statistics::summarize(&graph, 3);
        assert_eq!(stats.dead_ends, vec!["c".to_string()]);
        assert_eq!(stats.gateways.len(), 2);
    }
}
