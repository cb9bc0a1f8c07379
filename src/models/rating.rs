//! Quality ratings a learner assigns after reviewing a card.
use thiserror::Error;

/// Raised when a caller supplies a quality score outside 0-5.
/// The scheduler never clamps or guesses; bad input is rejected
/// before any review state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid rating {0}: quality grades range from 0 to 5")]
pub struct InvalidRating(pub u8);

/// Self-reported recall quality, 0 (complete blackout) to 5 (perfect).
///
/// Anything below `Easy` counts as a failed review and resets the
/// success streak, so `Moderate` schedules exactly like `Difficult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rating {
    VeryDifficult = 0,
    Difficult = 1,
    Moderate = 2,
    Easy = 3,
    VeryEasy = 4,
    Perfect = 5,
}

impl Rating {
    /// The raw quality score, 0-5.
    pub fn quality(self) -> u8 {
        self as u8
    }

    /// A rating of `Easy` or better keeps the success streak going.
    pub fn is_success(self) -> bool {
        self.quality() >= 3
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::VeryDifficult => "very difficult",
            Rating::Difficult => "difficult",
            Rating::Moderate => "moderate",
            Rating::Easy => "easy",
            Rating::VeryEasy => "very easy",
            Rating::Perfect => "perfect",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(quality: u8) -> Result<Self, Self::Error> {
        match quality {
            0 => Ok(Rating::VeryDifficult),
            1 => Ok(Rating::Difficult),
            2 => Ok(Rating::Moderate),
            3 => Ok(Rating::Easy),
            4 => Ok(Rating::VeryEasy),
            5 => Ok(Rating::Perfect),
            other => Err(InvalidRating(other)),
        }
    }
}
