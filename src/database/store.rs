//! Repository abstraction over flashcard and review-state persistence.
//!
//! The scheduling functions in `models::sm2` never see a connection; they
//! work on values handed to them. A `ReviewRepository` is the explicit seam
//! between those pure functions and whatever store a caller owns, so tests
//! and alternative backends can be swapped in freely.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Deck, DeckSet, Flashcard, ReviewState, sm2};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("deck not found: {0}")]
    DeckNotFound(String),

    #[error("card not found: {0}")]
    CardNotFound(i64),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Keyed access to decks, cards and their review states.
///
/// The repository does not serialize concurrent transitions on the same
/// card; a caller grading one card from two places at once must bring its
/// own per-card locking.
pub trait ReviewRepository {
    /// Creates a deck if it does not exist yet.
    fn create_deck(&self, name: &str) -> Result<()>;

    fn deck_names(&self) -> Result<Vec<String>>;

    /// Adds a card to a deck and initializes its review state, making the
    /// card due immediately. Adding the same (deck, term) twice returns the
    /// existing card id and leaves its schedule alone.
    fn add_card(&self, deck_name: &str, card: &Flashcard, now: DateTime<Utc>) -> Result<i64>;

    fn cards_for_deck(&self, deck_name: &str) -> Result<Vec<(i64, Flashcard)>>;

    /// Deletes a card; its review state is removed with it.
    fn delete_card(&self, card_id: i64) -> Result<()>;

    /// Point read of one card's review state.
    fn review_state(&self, card_id: i64) -> Result<Option<ReviewState>>;

    /// Overwrites one card's review state.
    fn put_review_state(&self, card_id: i64, state: &ReviewState) -> Result<()>;

    /// All (card id, review state) pairs of one deck; this is the range
    /// read that feeds the due selector.
    fn review_states_for_deck(&self, deck_name: &str) -> Result<Vec<(i64, ReviewState)>>;

    /// Cards of a deck due for review at `now`, earliest schedule first.
    ///
    /// Backends may override this with a native query as long as they keep
    /// the calendar-day inclusion rule and the (next_review_at, card id)
    /// ordering of `sm2::select_due`.
    fn due_cards(
        &self,
        deck_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(i64, Flashcard, ReviewState)>> {
        let states = self.review_states_for_deck(deck_name)?;
        let due = sm2::select_due(&states, now);

        let mut by_id: HashMap<i64, ReviewState> = states.into_iter().collect();
        let cards: HashMap<i64, Flashcard> = self.cards_for_deck(deck_name)?.into_iter().collect();

        Ok(due
            .into_iter()
            .filter_map(|card_id| {
                let card = cards.get(&card_id)?.clone();
                let state = by_id.remove(&card_id)?;
                Some((card_id, card, state))
            })
            .collect())
    }

    /// Loads every deck with its flashcards. Review states are fetched
    /// separately when a study session starts.
    fn load_all_decks(&self) -> Result<DeckSet> {
        let mut decks = Vec::new();
        for name in self.deck_names()? {
            let flashcards = self
                .cards_for_deck(&name)?
                .into_iter()
                .map(|(_, card)| card)
                .collect();
            decks.push(Deck { name, flashcards });
        }
        Ok(DeckSet { decks })
    }
}
