//! Per-card scheduling record for spaced repetition.
use chrono::{DateTime, Utc};

use super::sm2::MIN_EASINESS_FACTOR;

/// Scheduling state of a single flashcard. Created once when the card is
/// first added, then rewritten only by the scheduler after each review.
///
/// `next_review_at` always equals `last_reviewed_at` plus `interval_days`
/// whole days.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewState {
    /// Growth multiplier for review intervals, never below 1.3.
    pub easiness_factor: f64,
    /// Days until the next review after the most recent grade.
    pub interval_days: u32,
    /// Successful reviews in a row since the last failure.
    pub consecutive_successes: u32,
    pub last_reviewed_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewState {
    /// Restores the easiness floor on state read back from storage.
    ///
    /// A factor below 1.3 can only come from a corrupted or hand-edited
    /// row; scheduling continues with the clamped value and the anomaly
    /// is logged.
    pub fn sanitized(mut self) -> Self {
        if self.easiness_factor < MIN_EASINESS_FACTOR {
            log::warn!(
                "easiness factor {} below floor, clamping to {}",
                self.easiness_factor,
                MIN_EASINESS_FACTOR
            );
            self.easiness_factor = MIN_EASINESS_FACTOR;
        }
        self
    }
}
