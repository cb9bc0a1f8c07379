//! In-memory repository.
//!
//! Backed by plain maps behind a mutex; a drop-in replacement for the
//! SQLite store in tests and for callers that own their persistence.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::store::{Result, ReviewRepository, StorageError};
use crate::models::{Flashcard, ReviewState, sm2};

#[derive(Default)]
struct Inner {
    next_id: i64,
    decks: Vec<String>,
    cards: BTreeMap<i64, (String, Flashcard)>,
    states: BTreeMap<i64, ReviewState>,
}

#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Inner>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewRepository for MemoryRepository {
    fn create_deck(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.decks.iter().any(|deck| deck == name) {
            inner.decks.push(name.to_string());
        }
        Ok(())
    }

    fn deck_names(&self) -> Result<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        let mut names = inner.decks.clone();
        names.sort();
        Ok(names)
    }

    fn add_card(&self, deck_name: &str, card: &Flashcard, now: DateTime<Utc>) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.decks.iter().any(|deck| deck == deck_name) {
            return Err(StorageError::DeckNotFound(deck_name.to_string()));
        }

        // Same (deck, term) pair maps to the existing card and keeps its schedule
        if let Some((&card_id, _)) = inner
            .cards
            .iter()
            .find(|(_, (deck, existing))| deck == deck_name && existing.term == card.term)
        {
            return Ok(card_id);
        }

        inner.next_id += 1;
        let card_id = inner.next_id;
        inner
            .cards
            .insert(card_id, (deck_name.to_string(), card.clone()));
        inner.states.insert(card_id, sm2::initialize_review(now));
        Ok(card_id)
    }

    fn cards_for_deck(&self, deck_name: &str) -> Result<Vec<(i64, Flashcard)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .cards
            .iter()
            .filter(|(_, (deck, _))| deck == deck_name)
            .map(|(&card_id, (_, card))| (card_id, card.clone()))
            .collect())
    }

    fn delete_card(&self, card_id: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .cards
            .remove(&card_id)
            .ok_or(StorageError::CardNotFound(card_id))?;
        inner.states.remove(&card_id);
        Ok(())
    }

    fn review_state(&self, card_id: i64) -> Result<Option<ReviewState>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .states
            .get(&card_id)
            .cloned()
            .map(ReviewState::sanitized))
    }

    fn put_review_state(&self, card_id: i64, state: &ReviewState) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.cards.contains_key(&card_id) {
            return Err(StorageError::CardNotFound(card_id));
        }
        inner.states.insert(card_id, state.clone());
        Ok(())
    }

    fn review_states_for_deck(&self, deck_name: &str) -> Result<Vec<(i64, ReviewState)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .cards
            .iter()
            .filter(|(_, (deck, _))| deck == deck_name)
            .filter_map(|(&card_id, _)| {
                inner
                    .states
                    .get(&card_id)
                    .map(|state| (card_id, state.clone().sanitized()))
            })
            .collect())
    }
}
