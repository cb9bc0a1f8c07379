//! Multi-round study pass over the due cards of one deck.
//!
//! Cards failed in a round (quality < 3) come back in the next round of the
//! same session; every grade runs the scheduler and persists the new state
//! through the repository before the session moves on.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{Flashcard, InvalidRating, Rating, ReviewState, sm2};
use crate::database::{ReviewRepository, StorageError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rating(#[from] InvalidRating),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no card left to grade in this session")]
    Completed,
}

pub struct ReviewSession {
    pub deck_name: String,
    cards: Vec<(i64, Flashcard, ReviewState)>,
    queue: VecDeque<usize>,
    retry: Vec<usize>,
    round: usize,
}

impl ReviewSession {
    /// Starts a session over the due cards of a deck, in the order the due
    /// query returned them.
    pub fn new(deck_name: impl Into<String>, cards: Vec<(i64, Flashcard, ReviewState)>) -> Self {
        let queue = (0..cards.len()).collect();
        Self {
            deck_name: deck_name.into(),
            cards,
            queue,
            retry: Vec::new(),
            round: 1,
        }
    }

    /// The card awaiting a grade, if the session is still running.
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.queue.front().map(|&idx| &self.cards[idx].1)
    }

    /// Grades the current card, persists the scheduler transition, and
    /// advances the queue. A failed card re-enters in the next round.
    ///
    /// An out-of-range quality is rejected before anything changes, in the
    /// session or in the store.
    pub fn grade_current_card<R>(
        &mut self,
        repo: &R,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Result<Rating, SessionError>
    where
        R: ReviewRepository + ?Sized,
    {
        let rating = Rating::try_from(quality)?;
        let &idx = self.queue.front().ok_or(SessionError::Completed)?;

        let next = {
            let (card_id, _, state) = &self.cards[idx];
            let next = sm2::calculate_next_review(state, rating, now);
            repo.put_review_state(*card_id, &next)?;
            next
        };
        self.cards[idx].2 = next;

        self.queue.pop_front();
        if !rating.is_success() {
            self.retry.push(idx);
        }

        // Round over: failed cards go again
        if self.queue.is_empty() && !self.retry.is_empty() {
            self.queue = self.retry.drain(..).collect();
            self.round += 1;
        }

        Ok(rating)
    }

    pub fn is_completed(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn total_count(&self) -> usize {
        self.cards.len()
    }

    /// Cards still to be graded, including the ones queued for retry.
    pub fn remaining_count(&self) -> usize {
        self.queue.len() + self.retry.len()
    }

    pub fn round_banner(&self) -> String {
        if self.round == 1 {
            format!("Round {}: {} cards", self.round, self.queue.len())
        } else {
            format!("Round {} (retry): {} cards to go again", self.round, self.queue.len())
        }
    }
}
