//! Performance mode - an audience votes on the next vector.
//!
//! A window stays open for a fixed interval. When it closes the vector with
//! the most votes wins; a tie goes to whichever of the tied vectors was voted
//! for first.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use world_rules::Vector;

use crate::error::{Result, RippleError};

/// Voting settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub vote_window_ms: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            vote_window_ms: 5_000,
        }
    }
}

impl PerformanceConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.vote_window_ms)
    }
}

/// A single voting window.
#[derive(Debug, Clone)]
pub struct VoteWindow {
    opened_at: Instant,
    duration: Duration,
    tallies: [u32; 3],
    /// Sequence number of the first vote for each vector.
    first_vote: [Option<u64>; 3],
    seq: u64,
}

impl VoteWindow {
    pub fn open(now: Instant, duration: Duration) -> Self {
        Self {
            opened_at: now,
            duration,
            tallies: [0; 3],
            first_vote: [None; 3],
            seq: 0,
        }
    }

    pub fn closes_at(&self) -> Instant {
        self.opened_at + self.duration
    }

    pub fn is_open(&self, now: Instant) -> bool {
        now < self.closes_at()
    }

    /// Time left before the window closes.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.closes_at().saturating_duration_since(now)
    }

    /// Count a vote. Votes at or after the closing instant are rejected.
    pub fn cast(&mut self, vector: Vector, now: Instant) -> Result<()> {
        if !self.is_open(now) {
            return Err(RippleError::VoteWindowClosed);
        }
        let i = vector.index();
        self.tallies[i] += 1;
        self.first_vote[i].get_or_insert(self.seq);
        self.seq += 1;
        Ok(())
    }

    pub fn tally(&self, vector: Vector) -> u32 {
        self.tallies[vector.index()]
    }

    pub fn total(&self) -> u32 {
        self.tallies.iter().sum()
    }

    /// The winning vector, or `None` if nobody voted.
    pub fn majority(&self) -> Option<Vector> {
        Vector::ALL
            .into_iter()
            .filter(|v| self.tally(*v) > 0)
            .max_by(|a, b| {
                self.tally(*a).cmp(&self.tally(*b)).then_with(|| {
                    // Earlier first vote wins, so it must compare as greater.
                    self.first_vote[b.index()].cmp(&self.first_vote[a.index()])
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> (VoteWindow, Instant) {
        let now = Instant::now();
        (VoteWindow::open(now, Duration::from_millis(500)), now)
    }

    #[test]
    fn test_no_votes() {
        let (window, _) = window();
        assert_eq!(window.majority(), None);
        assert_eq!(window.total(), 0);
    }

    #[test]
    fn test_majority() {
        let (mut window, now) = window();
        window.cast(Vector::Goal, now).unwrap();
        window.cast(Vector::Obstacle, now).unwrap();
        window.cast(Vector::Obstacle, now).unwrap();

        assert_eq!(window.majority(), Some(Vector::Obstacle));
        assert_eq!(window.tally(Vector::Obstacle), 2);
        assert_eq!(window.total(), 3);
    }

    #[test]
    fn test_tie_goes_to_earliest_first_vote() {
        let (mut window, now) = window();
        window.cast(Vector::Shift, now).unwrap();
        window.cast(Vector::Goal, now).unwrap();
        window.cast(Vector::Goal, now).unwrap();
        window.cast(Vector::Shift, now).unwrap();

        assert_eq!(window.majority(), Some(Vector::Shift));
    }

    #[test]
    fn test_votes_after_close_are_rejected() {
        let (mut window, now) = window();
        let late = now + Duration::from_millis(500);

        assert!(!window.is_open(late));
        assert!(matches!(
            window.cast(Vector::Goal, late),
            Err(RippleError::VoteWindowClosed)
        ));
        assert_eq!(window.remaining(late), Duration::ZERO);
        assert_eq!(window.total(), 0);
    }
}
