use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::flashcard::Disposition;

/// Floor applied to every ease-factor update. SM-2 never lets an item's ease
/// drop below this, no matter how often it is failed.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to items that have never been reviewed.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while constructing review inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReviewError {
    #[error("invalid quality value: {0} (expected 0..=5)")]
    InvalidQuality(u8),
    #[error("ease factor must be finite and >= {MIN_EASE_FACTOR}, got {provided}")]
    InvalidEaseFactor { provided: f64 },
}

//
// ─── QUALITY ──────────────────────────────────────────────────────────────────
//

/// Six-level recall rating, the SM-2 quality scale.
///
/// Values 0-2 count as failures and restart the repetition ladder;
/// values 3-5 count as successful recalls:
/// - `Blackout`: no memory of the item at all
/// - `Incorrect`: wrong, but the answer felt familiar once revealed
/// - `Recognized`: wrong, but the answer seemed easy in hindsight
/// - `Difficult`: correct, with serious effort
/// - `Hesitant`: correct, after hesitation
/// - `Perfect`: correct, instantly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Total blackout; the item is effectively new again.
    Blackout,
    /// Incorrect response; the correct answer was remembered once seen.
    Incorrect,
    /// Incorrect response; the correct answer seemed easy to recall.
    Recognized,
    /// Correct response recalled with serious difficulty.
    Difficult,
    /// Correct response after hesitation.
    Hesitant,
    /// Perfect response with no hesitation.
    Perfect,
}

impl Quality {
    /// Converts a numeric rating (0-5) to a `Quality`.
    ///
    /// Out-of-range values are rejected rather than clamped, so a caller
    /// that forgot to validate its input hears about it immediately.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidQuality` if the value is not in 0..=5.
    pub fn from_u8(value: u8) -> Result<Self, ReviewError> {
        match value {
            0 => Ok(Self::Blackout),
            1 => Ok(Self::Incorrect),
            2 => Ok(Self::Recognized),
            3 => Ok(Self::Difficult),
            4 => Ok(Self::Hesitant),
            5 => Ok(Self::Perfect),
            _ => Err(ReviewError::InvalidQuality(value)),
        }
    }

    /// Numeric value on the 0-5 scale.
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Quality::Blackout => 0,
            Quality::Incorrect => 1,
            Quality::Recognized => 2,
            Quality::Difficult => 3,
            Quality::Hesitant => 4,
            Quality::Perfect => 5,
        }
    }

    /// True for qualities that count as a successful recall (>= 3).
    #[must_use]
    pub fn is_passing(self) -> bool {
        self.value() >= 3
    }
}

//
// ─── JUDGMENT ─────────────────────────────────────────────────────────────────
//

/// Binary per-card verdict a learner gives during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgment {
    /// The learner knew the card.
    Know,
    /// The learner did not know the card yet; keep it in rotation.
    StillLearning,
}

impl Judgment {
    /// The session disposition this judgment assigns to a card.
    #[must_use]
    pub fn disposition(self) -> Disposition {
        match self {
            Judgment::Know => Disposition::Know,
            Judgment::StillLearning => Disposition::StillLearning,
        }
    }

    /// Maps the binary verdict onto the 0-5 quality scale.
    ///
    /// `Know` is an unassisted correct recall and maps to `Perfect`.
    /// `StillLearning` maps to `Recognized`: the learner flipped the card and
    /// recognized the answer, which stays below the success threshold so the
    /// interval ladder restarts.
    #[must_use]
    pub fn quality(self) -> Quality {
        match self {
            Judgment::Know => Quality::Perfect,
            Judgment::StillLearning => Quality::Recognized,
        }
    }
}

//
// ─── REVIEW STATE ─────────────────────────────────────────────────────────────
//

/// One item's long-term scheduling state: the interval/ease pair SM-2
/// updates on every review.
///
/// An interval of 0 days means "never successfully reviewed". The ease
/// factor is validated on construction, so a `ReviewState` can never hold a
/// NaN or a value below [`MIN_EASE_FACTOR`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewState {
    interval_days: u32,
    ease_factor: f64,
}

impl ReviewState {
    /// State for an item that has never been reviewed.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            interval_days: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
        }
    }

    /// Reconstructs a state from persisted values.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidEaseFactor` if the ease factor is not
    /// finite or lies below [`MIN_EASE_FACTOR`].
    pub fn new(interval_days: u32, ease_factor: f64) -> Result<Self, ReviewError> {
        if !ease_factor.is_finite() || ease_factor < MIN_EASE_FACTOR {
            return Err(ReviewError::InvalidEaseFactor {
                provided: ease_factor,
            });
        }

        Ok(Self {
            interval_days,
            ease_factor,
        })
    }

    // Callers must have established the ease floor already.
    pub(crate) fn from_raw(interval_days: u32, ease_factor: f64) -> Self {
        Self {
            interval_days,
            ease_factor,
        }
    }

    /// Days until the item is due again.
    #[must_use]
    pub fn interval_days(&self) -> u32 {
        self.interval_days
    }

    #[must_use]
    pub fn ease_factor(&self) -> f64 {
        self.ease_factor
    }

    /// True if the item has never been successfully reviewed.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.interval_days == 0
    }

    /// Due date implied by this state for a review at `reviewed_at`.
    ///
    /// The scheduler itself never touches wall-clock time; callers derive the
    /// due date from the state when they persist it. Intervals too large for
    /// the calendar to represent saturate to `DateTime::<Utc>::MAX_UTC`,
    /// matching the interval computation's own saturation at `u32::MAX`.
    #[must_use]
    pub fn next_review_at(&self, reviewed_at: DateTime<Utc>) -> DateTime<Utc> {
        reviewed_at
            .checked_add_signed(Duration::days(i64::from(self.interval_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::fresh()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
