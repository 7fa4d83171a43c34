//! # Affect Space
//!
//! Named emotions placed on the two-dimensional valence/arousal plane. Both
//! axes are bounded to `[-1, 1]`:
//!
//! - **Valence**: negative (-1) to positive (+1) feeling
//! - **Arousal**: calm (-1) to energised (+1) activation
//!
//! The vocabulary is a fixed table built once at startup. Lookups are
//! case-insensitive, ignore surrounding whitespace and never fail: a name that
//! is not in the table resolves to the coordinates of `"neutral"`.
//!
//! ```
//! use isotune::affect::{self, AffectPoint};
//!
//! assert_eq!(affect::coordinates_of(" Calm "), AffectPoint::new(0.7, -0.7));
//! assert_eq!(affect::coordinates_of("totally-unknown"), AffectPoint::NEUTRAL);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the emotion every unknown name falls back to.
pub const NEUTRAL: &str = "neutral";

/// Default vocabulary, in table order. Table order matters: it is the scan
/// order used when picking the nearest emotion to a synthesized point.
const DEFAULT_TABLE: &[(&str, f64, f64)] = &[
    ("happy", 0.8, 0.8),
    ("sad", -0.7, -0.6),
    ("angry", -0.6, 0.7),
    ("fear", -0.4, 0.8),
    ("fearful", -0.4, 0.8),
    ("surprise", 0.1, 0.9),
    ("surprised", 0.1, 0.9),
    ("disgust", -0.7, 0.1),
    ("neutral", 0.0, 0.0),
    ("calm", 0.7, -0.7),
    ("anxious", -0.3, 0.6),
    ("focused", 0.3, 0.2),
    ("energized", 0.6, 0.8),
    ("relaxed", 0.5, -0.6),
    ("loving", 0.7, 0.3),
    // Intermediate states used by the gradual pathways
    ("melancholic", -0.5, -0.4),
    ("somber", -0.35, -0.2),
    ("irritated", -0.45, 0.5),
    ("tense", -0.2, 0.4),
    ("uneasy", -0.15, 0.3),
    ("content", 0.4, -0.3),
    ("serene", 0.6, -0.5),
    ("peaceful", 0.65, -0.6),
    ("hopeful", 0.3, 0.1),
    ("cheerful", 0.6, 0.5),
];

lazy_static::lazy_static! {
    /// Process-wide default affect space, built once from the static table.
    static ref DEFAULT_SPACE: AffectSpace = AffectSpace::from_table(DEFAULT_TABLE);
}

/// A point on the valence/arousal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffectPoint {
    pub valence: f64,
    pub arousal: f64,
}

impl AffectPoint {
    /// Coordinates of `"neutral"`, the origin of the plane.
    pub const NEUTRAL: Self = Self { valence: 0.0, arousal: 0.0 };

    #[must_use]
    pub const fn new(valence: f64, arousal: f64) -> Self {
        Self { valence, arousal }
    }

    /// Point at fraction `t` of the straight line from `self` to `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            valence: self.valence + (other.valence - self.valence) * t,
            arousal: self.arousal + (other.arousal - self.arousal) * t,
        }
    }

    /// Euclidean distance on the plane.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.valence - other.valence).hypot(self.arousal - other.arousal)
    }
}

/// Normalise a user-supplied emotion name: trimmed and lower-cased.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Immutable emotion vocabulary with coordinates.
///
/// The default space is shared process-wide through [`AffectSpace::global`].
/// Callers that need a different vocabulary build their own with
/// [`AffectSpace::from_table`] and pass it explicitly to the planner and
/// composer; there is no way to mutate a space after construction.
#[derive(Debug, Clone)]
pub struct AffectSpace {
    entries: Vec<(String, AffectPoint)>,
    index: HashMap<String, usize>,
}

impl AffectSpace {
    /// Build a space from `(name, valence, arousal)` rows. Names are
    /// normalised; a repeated name keeps its first coordinates. Coordinates
    /// are clamped into `[-1, 1]`.
    #[must_use]
    pub fn from_table(table: &[(&str, f64, f64)]) -> Self {
        let mut entries = Vec::with_capacity(table.len());
        let mut index = HashMap::with_capacity(table.len());

        for &(name, valence, arousal) in table {
            let key = normalize_name(name);
            if index.contains_key(&key) {
                continue;
            }
            index.insert(key.clone(), entries.len());
            entries.push((
                key,
                AffectPoint::new(valence.clamp(-1.0, 1.0), arousal.clamp(-1.0, 1.0)),
            ));
        }

        Self { entries, index }
    }

    /// The default vocabulary.
    #[must_use]
    pub fn global() -> &'static Self {
        &DEFAULT_SPACE
    }

    /// Coordinates of `emotion`, or of `"neutral"` when the name is unknown.
    ///
    /// Never fails. If the table itself has no `"neutral"` entry the origin
    /// is returned.
    #[must_use]
    pub fn coordinates_of(&self, emotion: &str) -> AffectPoint {
        self.lookup(emotion)
            .or_else(|| self.lookup(NEUTRAL))
            .unwrap_or(AffectPoint::NEUTRAL)
    }

    /// Coordinates of `emotion` only if it is part of the vocabulary.
    #[must_use]
    pub fn lookup(&self, emotion: &str) -> Option<AffectPoint> {
        self.index
            .get(&normalize_name(emotion))
            .map(|&i| self.entries[i].1)
    }

    #[must_use]
    pub fn contains(&self, emotion: &str) -> bool {
        self.index.contains_key(&normalize_name(emotion))
    }

    /// All emotions with their coordinates, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, AffectPoint)> + '_ {
        self.entries.iter().map(|(name, point)| (name.as_str(), *point))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emotion whose point is nearest (Euclidean) to `target`, skipping any
    /// name in `exclude`. Ties keep the earliest entry in table order.
    #[must_use]
    pub fn nearest_emotion(&self, target: AffectPoint, exclude: &[&str]) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(name, _)| !exclude.contains(&name.as_str()))
            .fold(None::<(&str, f64)>, |best, (name, point)| {
                let dist = point.distance(target);
                match best {
                    Some((_, best_dist)) if best_dist <= dist => best,
                    _ => Some((name.as_str(), dist)),
                }
            })
            .map(|(name, _)| name)
    }
}

impl Default for AffectSpace {
    fn default() -> Self {
        Self::from_table(DEFAULT_TABLE)
    }
}

/// Coordinates of `emotion` in the default space.
#[must_use]
pub fn coordinates_of(emotion: &str) -> AffectPoint {
    AffectSpace::global().coordinates_of(emotion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_emotion_falls_back_to_neutral() {
        let space = AffectSpace::global();
        assert_eq!(space.coordinates_of("totally-unknown-xyz"), AffectPoint::NEUTRAL);
        assert_eq!(space.coordinates_of("neutral"), AffectPoint::NEUTRAL);
        assert_eq!(space.coordinates_of(""), AffectPoint::NEUTRAL);
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        assert_eq!(coordinates_of("  HaPPy\t"), AffectPoint::new(0.8, 0.8));
        assert_eq!(coordinates_of("SAD"), coordinates_of("sad"));
    }

    #[test]
    fn test_all_points_within_bounds() {
        for (name, point) in AffectSpace::global().iter() {
            assert!((-1.0..=1.0).contains(&point.valence), "{name} valence out of range");
            assert!((-1.0..=1.0).contains(&point.arousal), "{name} arousal out of range");
        }
    }

    #[test]
    fn test_custom_table_without_neutral_uses_origin() {
        let space = AffectSpace::from_table(&[("bright", 0.5, 0.5), ("BRIGHT", -1.0, -1.0)]);
        assert_eq!(space.len(), 1, "Repeated names keep the first entry");
        assert_eq!(space.coordinates_of("dim"), AffectPoint::NEUTRAL);
        assert_eq!(space.coordinates_of("bright"), AffectPoint::new(0.5, 0.5));
    }

    #[test]
    fn test_table_coordinates_are_clamped() {
        let space = AffectSpace::from_table(&[("wild", 3.0, -7.5)]);
        assert_eq!(space.coordinates_of("wild"), AffectPoint::new(1.0, -1.0));
    }

    #[test]
    fn test_nearest_emotion_respects_exclusions() {
        let space = AffectSpace::global();
        let origin = AffectPoint::NEUTRAL;
        assert_eq!(space.nearest_emotion(origin, &[]), Some("neutral"));

        let next = space.nearest_emotion(origin, &["neutral"]);
        assert!(next.is_some());
        assert_ne!(next, Some("neutral"));
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = AffectPoint::new(-1.0, 1.0);
        let b = AffectPoint::new(1.0, -1.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), AffectPoint::NEUTRAL);
    }
}
