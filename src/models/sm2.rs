//! SM-2 (SuperMemo 2) spaced repetition scheduling.
//!
//! The SM-2 algorithm calculates optimal review intervals from recall quality:
//! - Each card has an easiness factor (EF) that adjusts after every review
//!   and never falls below 1.3
//! - Quality grades 0-2 reset the success streak and schedule the card for
//!   tomorrow (card needs relearning)
//! - Quality grades 3-5 grow the interval progressively (1 day → 6 days →
//!   previous interval × EF)
//!
//! Everything in this module is a pure function over an explicit `now`; the
//! caller owns storage and the clock.

use chrono::{DateTime, Duration, Utc};

use super::{Rating, ReviewState};

/// Easiness factor assigned to a freshly added card.
pub const DEFAULT_EASINESS_FACTOR: f64 = 2.5;

/// Floor below which the easiness factor never drops.
pub const MIN_EASINESS_FACTOR: f64 = 1.3;

/// Review state for a card seen for the first time.
///
/// The interval is zero and `next_review_at` equals `now`, so a new card
/// shows up in the very next due query.
pub fn initialize_review(now: DateTime<Utc>) -> ReviewState {
    ReviewState {
        easiness_factor: DEFAULT_EASINESS_FACTOR,
        interval_days: 0,
        consecutive_successes: 0,
        last_reviewed_at: now,
        next_review_at: now,
    }
}

/// Calculates the review state following a graded review.
///
/// Returns a fully new state; the input is never mutated. The easiness
/// factor is updated for every grade, successful or not.
pub fn calculate_next_review(
    state: &ReviewState,
    rating: Rating,
    now: DateTime<Utc>,
) -> ReviewState {
    // New E-Factor: EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
    let q = rating.quality() as f64;
    let mut new_ef = state.easiness_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
    if new_ef < MIN_EASINESS_FACTOR {
        new_ef = MIN_EASINESS_FACTOR;
    }

    let (new_interval, new_streak) = if !rating.is_success() {
        // Failed recall: streak over, review again tomorrow
        (1, 0)
    } else {
        let streak = state.consecutive_successes + 1;
        let interval = match streak {
            1 => 1,
            2 => 6,
            // Third success onward: previous interval stretched by the new EF
            _ => (state.interval_days as f64 * new_ef).round() as u32,
        };
        (interval, streak)
    };

    ReviewState {
        easiness_factor: new_ef,
        interval_days: new_interval,
        consecutive_successes: new_streak,
        last_reviewed_at: now,
        next_review_at: now + Duration::days(new_interval as i64),
    }
}

/// Whether a card's scheduled review date has arrived.
///
/// Comparison is by calendar day (UTC): a card due later today is already
/// due, regardless of time of day.
pub fn is_due_for_review(state: &ReviewState, now: DateTime<Utc>) -> bool {
    state.next_review_at.date_naive() <= now.date_naive()
}

/// Card ids due for review at `now`, earliest schedule first.
///
/// Ordering is ascending by `next_review_at` with the card id as tie
/// break, so repeated calls over unchanged input return the same sequence.
/// Cards without a review state are simply not in `states` and therefore
/// never selected.
pub fn select_due(states: &[(i64, ReviewState)], now: DateTime<Utc>) -> Vec<i64> {
    let mut due: Vec<(DateTime<Utc>, i64)> = states
        .iter()
        .filter(|(_, state)| is_due_for_review(state, now))
        .map(|(card_id, state)| (state.next_review_at, *card_id))
        .collect();

    due.sort_unstable();
    due.into_iter().map(|(_, card_id)| card_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day_zero() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn rating(quality: u8) -> Rating {
        Rating::try_from(quality).unwrap()
    }

    #[test]
    fn test_new_card_is_due_immediately() {
        let now = day_zero();
        let state = initialize_review(now);

        assert_eq!(state.easiness_factor, DEFAULT_EASINESS_FACTOR);
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.consecutive_successes, 0);
        assert_eq!(state.last_reviewed_at, now);
        assert_eq!(state.next_review_at, now);
        assert!(is_due_for_review(&state, now));
    }

    #[test]
    fn test_first_success() {
        let now = day_zero();
        let state = initialize_review(now);

        let next = calculate_next_review(&state, rating(3), now);
        assert!((next.easiness_factor - 2.36).abs() < 1e-9);
        assert_eq!(next.consecutive_successes, 1);
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.last_reviewed_at, now);
        assert_eq!(next.next_review_at, now + Duration::days(1));
    }

    #[test]
    fn test_success_ladder() {
        let d0 = day_zero();
        let first = calculate_next_review(&initialize_review(d0), rating(3), d0);

        let d1 = d0 + Duration::days(1);
        let second = calculate_next_review(&first, rating(3), d1);
        assert_eq!(second.interval_days, 6);
        assert_eq!(second.consecutive_successes, 2);

        let d7 = d1 + Duration::days(6);
        let third = calculate_next_review(&second, rating(3), d7);
        let expected = (6.0 * third.easiness_factor).round() as u32;
        assert_eq!(third.interval_days, expected);
        assert_eq!(third.interval_days, 12);
        assert_eq!(third.consecutive_successes, 3);
        assert_eq!(third.next_review_at, d7 + Duration::days(12));
    }

    #[test]
    fn test_failure_resets_streak() {
        let d0 = day_zero();
        let first = calculate_next_review(&initialize_review(d0), rating(3), d0);
        let second = calculate_next_review(&first, rating(3), d0 + Duration::days(1));

        let failed = calculate_next_review(&second, rating(1), d0 + Duration::days(7));
        assert_eq!(failed.consecutive_successes, 0);
        assert_eq!(failed.interval_days, 1);
        // EF still drops on failure
        assert!(failed.easiness_factor < second.easiness_factor);
        assert!(failed.easiness_factor >= MIN_EASINESS_FACTOR);
    }

    #[test]
    fn test_moderate_counts_as_failure() {
        let d0 = day_zero();
        let first = calculate_next_review(&initialize_review(d0), rating(4), d0);

        let next = calculate_next_review(&first, rating(2), d0 + Duration::days(1));
        assert_eq!(next.consecutive_successes, 0);
        assert_eq!(next.interval_days, 1);
    }

    #[test]
    fn test_ef_floor_holds_for_any_sequence() {
        let mut now = day_zero();
        for first in 0..=5u8 {
            for second in 0..=5u8 {
                let mut state = initialize_review(now);
                for &quality in &[first, second, 0, 0, 0, first] {
                    state = calculate_next_review(&state, rating(quality), now);
                    assert!(state.easiness_factor >= MIN_EASINESS_FACTOR);
                    assert_eq!(
                        state.next_review_at,
                        state.last_reviewed_at + Duration::days(state.interval_days as i64)
                    );
                }
                now += Duration::days(1);
            }
        }
    }

    #[test]
    fn test_is_due_ignores_time_of_day() {
        let mut state = initialize_review(day_zero());
        // Scheduled for 23:59 today; a query at 00:01 already counts it
        state.next_review_at = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 0).unwrap();

        let early_same_day = Utc.with_ymd_and_hms(2024, 3, 5, 0, 1, 0).unwrap();
        assert!(is_due_for_review(&state, early_same_day));

        let day_before = Utc.with_ymd_and_hms(2024, 3, 4, 23, 59, 0).unwrap();
        assert!(!is_due_for_review(&state, day_before));
    }

    #[test]
    fn test_select_due_filters_and_orders() {
        let now = day_zero();
        let overdue = ReviewState {
            next_review_at: now - Duration::days(1),
            ..initialize_review(now)
        };
        let due_today = initialize_review(now);
        let tomorrow = ReviewState {
            next_review_at: now + Duration::days(1),
            ..initialize_review(now)
        };

        let states = vec![(7, due_today), (3, tomorrow), (5, overdue)];
        assert_eq!(select_due(&states, now), vec![5, 7]);
    }

    #[test]
    fn test_select_due_is_deterministic() {
        let now = day_zero();
        // Same schedule on every card: ordering falls back to the card id
        let states: Vec<(i64, ReviewState)> = [9, 2, 4]
            .into_iter()
            .map(|id| (id, initialize_review(now)))
            .collect();

        let first_pass = select_due(&states, now);
        assert_eq!(first_pass, vec![2, 4, 9]);
        assert_eq!(select_due(&states, now), first_pass);
    }

    #[test]
    fn test_select_due_empty_input() {
        assert!(select_due(&[], day_zero()).is_empty());
    }
}
