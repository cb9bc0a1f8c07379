//! Flashcard is a pair <term, definition> with an optional category tag.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Flashcard {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard::new("cześć", "hello");
        assert_eq!(card.term, "cześć");
        assert_eq!(card.definition, "hello");
        assert_eq!(card.category, None);
    }

    #[test]
    fn test_category_tag() {
        let card = Flashcard::new("mitochondrion", "powerhouse of the cell")
            .with_category("biology");
        assert_eq!(card.category.as_deref(), Some("biology"));
    }

    #[test]
    fn test_category_absent_from_json_when_unset() {
        let card = Flashcard::new("hello", "cześć");
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("category"));
    }
}
