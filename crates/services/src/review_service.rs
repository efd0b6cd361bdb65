use chrono::{DateTime, Utc};

use vocab_core::model::{Judgment, Quality, ReviewState};
use vocab_core::scheduler::compute_next_review;
use vocab_core::time::Clock;

//
// ─── GRADED REVIEW ─────────────────────────────────────────────────────────────
//

/// Outcome of grading one judged recall: the quality the judgment mapped to,
/// the updated scheduling state, and when the word comes due again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradedReview {
    pub quality: Quality,
    pub state: ReviewState,
    pub due_at: DateTime<Utc>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Turns session judgments into scheduling updates.
///
/// A session only ever says "know" or "still learning"; this service maps
/// those onto recall qualities and runs the scheduler against the word's
/// previous state. Words that have never been scheduled start from the
/// configured initial state.
pub struct ReviewService {
    clock: Clock,
    initial_state: ReviewState,
}

impl ReviewService {
    /// Create a review service with a real-time clock and a fresh initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Clock::default(),
            initial_state: ReviewState::fresh(),
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Override the state unscheduled words start from.
    #[must_use]
    pub fn with_initial_state(mut self, initial_state: ReviewState) -> Self {
        self.initial_state = initial_state;
        self
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Grade a judgment against a word's previous scheduling state.
    ///
    /// "Know" grades as a perfect recall and climbs the interval ladder;
    /// "still learning" grades below the passing threshold, so the interval
    /// restarts at one day while the ease factor takes the corresponding hit.
    #[must_use]
    pub fn grade(&self, judgment: Judgment, previous: Option<ReviewState>) -> GradedReview {
        let quality = judgment.quality();
        let state = compute_next_review(quality, previous.unwrap_or(self.initial_state));

        GradedReview {
            quality,
            state,
            due_at: state.next_review_at(self.clock.now()),
        }
    }
}

impl Default for ReviewService {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
