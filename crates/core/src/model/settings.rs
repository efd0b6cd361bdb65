use crate::model::review::{ReviewError, ReviewState};

/// Configuration for one review session.
///
/// Controls how the session workflow seeds scheduler state and orders the
/// deck. Validated on construction so downstream code can rely on the
/// starting ease without re-checking it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    initial_state: ReviewState,
    shuffle_deck: bool,
    scheduling_enabled: bool,
}

impl SessionSettings {
    /// Default review settings: conventional 2.5 starting ease, deck kept in
    /// load order, scheduler updates enabled.
    #[must_use]
    pub fn default_review() -> Self {
        Self {
            initial_state: ReviewState::fresh(),
            shuffle_deck: false,
            scheduling_enabled: true,
        }
    }

    /// Creates custom session settings.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidEaseFactor` if the starting ease is not
    /// finite or lies below the scheduler's floor.
    pub fn new(
        starting_ease_factor: f64,
        shuffle_deck: bool,
        scheduling_enabled: bool,
    ) -> Result<Self, ReviewError> {
        let initial_state = ReviewState::new(0, starting_ease_factor)?;

        Ok(Self {
            initial_state,
            shuffle_deck,
            scheduling_enabled,
        })
    }

    // Accessors
    #[must_use]
    pub fn starting_ease_factor(&self) -> f64 {
        self.initial_state.ease_factor()
    }

    /// Pre-validated scheduling state for a never-reviewed item.
    #[must_use]
    pub fn initial_review_state(&self) -> ReviewState {
        self.initial_state
    }

    /// When true, the deck is shuffled once at session start.
    #[must_use]
    pub fn shuffle_deck(&self) -> bool {
        self.shuffle_deck
    }

    /// When true, judgments also produce interval/ease updates.
    #[must_use]
    pub fn scheduling_enabled(&self) -> bool {
        self.scheduling_enabled
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::default_review()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
