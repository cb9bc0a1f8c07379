//! JSON import/export for flashcard decks.
//!
//! Decks travel as plain JSON files. Importing into a repository pushes
//! every card through the normal add path, so imported cards start with a
//! freshly initialized schedule and are due immediately.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::database::{ReviewRepository, StorageError};
use crate::models::Deck;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Writes a deck to a pretty-printed JSON file.
pub fn export_deck(deck: &Deck, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(deck)?;
    fs::write(path.as_ref(), json)?;
    log::info!("deck '{}' exported to {}", deck.name, path.as_ref().display());
    Ok(())
}

/// Reads a deck back from a JSON file.
pub fn import_deck(path: impl AsRef<Path>) -> Result<Deck, ExportError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let deck: Deck = serde_json::from_str(&contents)?;
    Ok(deck)
}

/// Imports a deck file straight into a repository.
pub fn import_deck_into<R>(
    path: impl AsRef<Path>,
    repo: &R,
    now: DateTime<Utc>,
) -> Result<Deck, ExportError>
where
    R: ReviewRepository + ?Sized,
{
    let deck = import_deck(path)?;
    repo.create_deck(&deck.name)?;
    for card in &deck.flashcards {
        repo.add_card(&deck.name, card, now)?;
    }
    log::info!("deck '{}' imported ({} cards)", deck.name, deck.flashcards.len());
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryRepository;
    use crate::models::Flashcard;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn test_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    fn sample_deck() -> Deck {
        Deck {
            name: "Biology".to_string(),
            flashcards: vec![
                Flashcard::new("mitochondrion", "powerhouse of the cell").with_category("cells"),
                Flashcard::new("ribosome", "builds proteins"),
            ],
        }
    }

    #[test]
    fn test_export_then_import() {
        let path = test_path("flashsmart_export_test.json");
        let deck = sample_deck();

        export_deck(&deck, &path).unwrap();
        let imported = import_deck(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(imported.name, deck.name);
        assert_eq!(imported.flashcards, deck.flashcards);
    }

    #[test]
    fn test_import_missing_file() {
        let result = import_deck(test_path("flashsmart_missing_xyz.json"));
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let path = test_path("flashsmart_invalid_test.json");
        std::fs::write(&path, "{ this is not a deck }").unwrap();

        let result = import_deck(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(ExportError::Json(_))));
    }

    #[test]
    fn test_imported_cards_are_due_immediately() {
        let path = test_path("flashsmart_import_into_test.json");
        export_deck(&sample_deck(), &path).unwrap();

        let repo = MemoryRepository::new();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let deck = import_deck_into(&path, &repo, now).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(deck.flashcards.len(), 2);
        assert_eq!(repo.due_cards("Biology", now).unwrap().len(), 2);
    }
}
