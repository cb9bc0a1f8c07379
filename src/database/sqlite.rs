//! SQLite-backed repository.
//!
//! Handles schema creation, CRUD for decks and flashcards, and persistence
//! of per-card review state. Timestamps are stored as integer epoch seconds
//! so rows round-trip exactly.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::store::{Result, ReviewRepository, StorageError};
use crate::models::{Clock, Flashcard, ReviewState, sm2};

/// Repository over a single SQLite database file.
///
/// Also owns the simulated study date kept in the `app_state` table, which
/// lets a learner step the calendar forward day by day to exercise spaced
/// schedules without waiting for real time to pass.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) the database at `path` and runs the schema.
    ///
    /// The simulated study date is seeded from `clock` the first time the
    /// database is created.
    pub fn open(path: &str, clock: &dyn Clock) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, clock)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory(clock: &dyn Clock) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, clock)
    }

    fn with_connection(conn: Connection, clock: &dyn Clock) -> Result<Self> {
        // Required for ON DELETE CASCADE to fire
        conn.pragma_update(None, "foreign_keys", true)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS decks (
                name TEXT PRIMARY KEY
            )",
            (),
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS flashcards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                deck_name TEXT NOT NULL,
                term TEXT NOT NULL,
                definition TEXT NOT NULL,
                category TEXT,
                FOREIGN KEY (deck_name) REFERENCES decks(name) ON DELETE CASCADE,
                UNIQUE(deck_name, term)
            )",
            (),
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS review_data (
                flashcard_id INTEGER PRIMARY KEY,
                easiness_factor REAL NOT NULL,
                interval_days INTEGER NOT NULL,
                consecutive_successes INTEGER NOT NULL,
                last_reviewed_at INTEGER NOT NULL,
                next_review_at INTEGER NOT NULL,
                FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
            )",
            (),
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
            params![clock.now().timestamp().to_string()],
        )?;

        Ok(Self { conn })
    }

    /// Current simulated study date.
    pub fn current_date(&self) -> Result<DateTime<Utc>> {
        let stored: String = self.conn.query_row(
            "SELECT value FROM app_state WHERE key = 'current_date'",
            [],
            |row| row.get(0),
        )?;

        let secs = stored.parse::<i64>().unwrap_or(0);
        Ok(datetime_from_secs(secs))
    }

    /// Advances the simulated study date by 24 hours.
    pub fn advance_day(&self) -> Result<DateTime<Utc>> {
        let next_day = self.current_date()? + Duration::days(1);
        self.conn.execute(
            "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
            params![next_day.timestamp().to_string()],
        )?;
        Ok(next_day)
    }

    fn deck_exists(&self, name: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM decks WHERE name = ?1)",
            params![name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

impl ReviewRepository for SqliteRepository {
    fn create_deck(&self, name: &str) -> Result<()> {
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO decks (name) VALUES (?1)", params![name])?;
        if inserted > 0 {
            log::info!("deck '{}' created", name);
        }
        Ok(())
    }

    fn deck_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM decks ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn add_card(&self, deck_name: &str, card: &Flashcard, now: DateTime<Utc>) -> Result<i64> {
        if !self.deck_exists(deck_name)? {
            return Err(StorageError::DeckNotFound(deck_name.to_string()));
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO flashcards (deck_name, term, definition, category)
             VALUES (?1, ?2, ?3, ?4)",
            params![deck_name, card.term, card.definition, card.category],
        )?;

        let card_id: i64 = self.conn.query_row(
            "SELECT id FROM flashcards WHERE deck_name = ?1 AND term = ?2",
            params![deck_name, card.term],
            |row| row.get(0),
        )?;

        // Fresh cards are due immediately; re-adding an existing term keeps
        // its current schedule
        let state = sm2::initialize_review(now);
        self.conn.execute(
            "INSERT OR IGNORE INTO review_data
             (flashcard_id, easiness_factor, interval_days, consecutive_successes,
              last_reviewed_at, next_review_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                card_id,
                state.easiness_factor,
                state.interval_days,
                state.consecutive_successes,
                state.last_reviewed_at.timestamp(),
                state.next_review_at.timestamp(),
            ],
        )?;

        Ok(card_id)
    }

    fn cards_for_deck(&self, deck_name: &str) -> Result<Vec<(i64, Flashcard)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, term, definition, category FROM flashcards
             WHERE deck_name = ?1 ORDER BY id",
        )?;

        let cards = stmt
            .query_map(params![deck_name], |row| {
                Ok((
                    row.get(0)?,
                    Flashcard {
                        term: row.get(1)?,
                        definition: row.get(2)?,
                        category: row.get(3)?,
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<(i64, Flashcard)>>>()?;

        Ok(cards)
    }

    fn delete_card(&self, card_id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM flashcards WHERE id = ?1", params![card_id])?;
        if deleted == 0 {
            return Err(StorageError::CardNotFound(card_id));
        }
        Ok(())
    }

    fn review_state(&self, card_id: i64) -> Result<Option<ReviewState>> {
        let state = self
            .conn
            .query_row(
                "SELECT easiness_factor, interval_days, consecutive_successes,
                        last_reviewed_at, next_review_at
                 FROM review_data WHERE flashcard_id = ?1",
                params![card_id],
                state_from_row,
            )
            .optional()?;

        Ok(state.map(ReviewState::sanitized))
    }

    fn put_review_state(&self, card_id: i64, state: &ReviewState) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE review_data
             SET easiness_factor = ?1, interval_days = ?2, consecutive_successes = ?3,
                 last_reviewed_at = ?4, next_review_at = ?5
             WHERE flashcard_id = ?6",
            params![
                state.easiness_factor,
                state.interval_days,
                state.consecutive_successes,
                state.last_reviewed_at.timestamp(),
                state.next_review_at.timestamp(),
                card_id,
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::CardNotFound(card_id));
        }
        Ok(())
    }

    fn review_states_for_deck(&self, deck_name: &str) -> Result<Vec<(i64, ReviewState)>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, r.easiness_factor, r.interval_days, r.consecutive_successes,
                    r.last_reviewed_at, r.next_review_at
             FROM flashcards f
             JOIN review_data r ON f.id = r.flashcard_id
             WHERE f.deck_name = ?1",
        )?;

        let states = stmt
            .query_map(params![deck_name], |row| {
                let card_id: i64 = row.get(0)?;
                Ok((
                    card_id,
                    ReviewState {
                        easiness_factor: row.get(1)?,
                        interval_days: row.get(2)?,
                        consecutive_successes: row.get(3)?,
                        last_reviewed_at: datetime_from_secs(row.get(4)?),
                        next_review_at: datetime_from_secs(row.get(5)?),
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(states
            .into_iter()
            .map(|(card_id, state)| (card_id, state.sanitized()))
            .collect())
    }

    /// Native due query; matches the inclusion rule and ordering of
    /// `sm2::select_due` (whole-day comparison, card id as tie break).
    fn due_cards(
        &self,
        deck_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(i64, Flashcard, ReviewState)>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.term, f.definition, f.category,
                    r.easiness_factor, r.interval_days, r.consecutive_successes,
                    r.last_reviewed_at, r.next_review_at
             FROM flashcards f
             JOIN review_data r ON f.id = r.flashcard_id
             WHERE f.deck_name = ?1 AND r.next_review_at / 86400 <= ?2 / 86400
             ORDER BY r.next_review_at ASC, f.id ASC",
        )?;

        let rows = stmt
            .query_map(params![deck_name, now.timestamp()], |row| {
                let card_id: i64 = row.get(0)?;
                Ok((
                    card_id,
                    Flashcard {
                        term: row.get(1)?,
                        definition: row.get(2)?,
                        category: row.get(3)?,
                    },
                    ReviewState {
                        easiness_factor: row.get(4)?,
                        interval_days: row.get(5)?,
                        consecutive_successes: row.get(6)?,
                        last_reviewed_at: datetime_from_secs(row.get(7)?),
                        next_review_at: datetime_from_secs(row.get(8)?),
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .map(|(card_id, card, state)| (card_id, card, state.sanitized()))
            .collect())
    }
}

fn state_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReviewState> {
    Ok(ReviewState {
        easiness_factor: row.get(0)?,
        interval_days: row.get(1)?,
        consecutive_successes: row.get(2)?,
        last_reviewed_at: datetime_from_secs(row.get(3)?),
        next_review_at: datetime_from_secs(row.get(4)?),
    })
}

fn datetime_from_secs(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
