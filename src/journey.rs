//! Multi-session journeys.
//!
//! A journey fixes its [`EmotionPath`] once, when it starts, and then moves
//! through it one transition per session. Later sessions never re-plan from
//! the listener's current mood; they only advance the step.

use crate::path::{EmotionPath, PathPlanner};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Journey {
    path: EmotionPath,
    step: usize,
}

impl Journey {
    /// Plan the path for a new journey, starting at the first transition.
    #[must_use]
    pub fn plan(planner: &PathPlanner<'_>, start: &str, target: &str) -> Self {
        Self::from_path(planner.find_path(start, target))
    }

    #[must_use]
    pub fn from_path(path: EmotionPath) -> Self {
        Self { path, step: 0 }
    }

    /// Same path, positioned at `step` (clamped to the last transition).
    #[must_use]
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step.min(self.last_step());
        self
    }

    #[must_use]
    pub fn path(&self) -> &EmotionPath {
        &self.path
    }

    /// Zero-based index of the current transition.
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.step
    }

    /// Number of transitions (sessions) in the whole journey.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.path.transitions()
    }

    /// The `(from, to)` pair worked on in the current session, `None` when
    /// start and target are the same emotion.
    #[must_use]
    pub fn current_transition(&self) -> Option<(&str, &str)> {
        self.path.segments().nth(self.step)
    }

    /// Emotions still ahead, starting with the current transition's target.
    #[must_use]
    pub fn remaining(&self) -> &[String] {
        self.path.emotions().get(self.step + 1..).unwrap_or_default()
    }

    /// Sessions left after the current one.
    #[must_use]
    pub fn sessions_after_current(&self) -> usize {
        self.remaining().len().saturating_sub(1)
    }

    /// Move to the next transition. Returns `false` when already on the last.
    pub fn advance(&mut self) -> bool {
        if self.step < self.last_step() {
            self.step += 1;
            true
        } else {
            false
        }
    }

    /// True when the current transition is the last one, or there is none.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.step >= self.last_step()
    }

    fn last_step(&self) -> usize {
        self.total_steps().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey(start: &str, target: &str) -> Journey {
        Journey::plan(&PathPlanner::default(), start, target)
    }

    #[test]
    fn test_walks_one_transition_per_session() {
        let mut journey = journey("angry", "calm");
        assert_eq!(journey.total_steps(), 7);
        assert_eq!(journey.current_transition(), Some(("angry", "irritated")));
        assert_eq!(journey.sessions_after_current(), 6);
        assert!(!journey.is_complete());

        assert!(journey.advance());
        assert_eq!(journey.current_step(), 1);
        assert_eq!(journey.current_transition(), Some(("irritated", "tense")));
        assert_eq!(journey.remaining().first().map(String::as_str), Some("tense"));
    }

    #[test]
    fn test_advance_stops_at_last_transition() {
        let mut journey = journey("serene", "peaceful");
        assert_eq!(journey.total_steps(), 2);
        assert!(journey.advance());
        assert!(journey.is_complete());
        assert!(!journey.advance());
        assert_eq!(journey.current_step(), 1);
        assert_eq!(journey.current_transition(), Some(("relaxed", "peaceful")));
        assert_eq!(journey.remaining(), ["peaceful"]);
        assert_eq!(journey.sessions_after_current(), 0);
    }

    #[test]
    fn test_step_is_clamped() {
        let journey = journey("sad", "happy").with_step(99);
        assert_eq!(journey.current_step(), 5);
        assert_eq!(journey.current_transition(), Some(("cheerful", "happy")));
    }

    #[test]
    fn test_same_mood_journey_has_no_transition() {
        let journey = journey("calm", "calm").with_step(3);
        assert_eq!(journey.total_steps(), 0);
        assert_eq!(journey.current_step(), 0);
        assert!(journey.current_transition().is_none());
        assert!(journey.remaining().is_empty());
        assert!(journey.is_complete());
    }
}
