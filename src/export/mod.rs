pub mod json;

pub use json::{ExportError, export_deck, import_deck, import_deck_into};
