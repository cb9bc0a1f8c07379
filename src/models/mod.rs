pub mod clock;
pub mod deck;
pub mod deck_set;
pub mod flashcard;
pub mod rating;
pub mod review_session;
pub mod review_state;
pub mod sm2;

pub use clock::{Clock, FixedClock, SystemClock};
pub use deck::Deck;
pub use deck_set::DeckSet;
pub use flashcard::Flashcard;
pub use rating::{InvalidRating, Rating};
pub use review_session::{ReviewSession, SessionError};
pub use review_state::ReviewState;
