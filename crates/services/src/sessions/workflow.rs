use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::warn;
use rand::rng;
use rand::seq::SliceRandom;

use storage::repository::{
    FlashcardRecord, FlashcardStore, ReviewStateRecord, ReviewStateStore, StorageError,
};
use vocab_core::model::{
    Flashcard, FlashcardId, Judgment, ReviewState, SessionSettings, UserId, WordId,
};

use super::engine::{JudgedCard, ReviewSession};
use super::progress::DeckCounts;
use crate::Clock;
use crate::error::SessionError;
use crate::review_service::{GradedReview, ReviewService};

//
// ─── WRITE-THROUGH REPORTING ───────────────────────────────────────────────────
//

/// Persistence operation attempted after an in-memory transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    SaveDisposition,
    SaveReviewState,
    ResetDeck,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SaveDisposition => "save_disposition",
            Self::SaveReviewState => "save_review_state",
            Self::ResetDeck => "reset_deck",
        };
        f.write_str(name)
    }
}

/// A write that failed after the in-memory state had already moved on.
#[derive(Debug)]
pub struct WriteFailure {
    pub op: WriteOp,
    pub error: StorageError,
}

/// Failures collected during one operation's write-through pass.
///
/// Writes are optimistic: the in-memory session is the source of truth and a
/// failed write never rolls it back or fails the operation. Each failure is
/// logged as it happens and kept here for callers that want to react,
/// typically by scheduling a retry or flagging sync status.
#[derive(Debug, Default)]
pub struct PersistenceReport {
    failures: Vec<WriteFailure>,
}

impl PersistenceReport {
    fn record(&mut self, op: WriteOp, error: StorageError) {
        warn!("write-through {op} failed, keeping in-memory state: {error}");
        self.failures.push(WriteFailure { op, error });
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failures(&self) -> &[WriteFailure] {
        &self.failures
    }
}

/// Result of judging the current flashcard through the workflow.
#[derive(Debug)]
pub struct JudgeResult {
    pub card: JudgedCard,
    /// Scheduling update for the judged word; `None` when scheduling is
    /// disabled in the session settings.
    pub review: Option<GradedReview>,
    pub writes: PersistenceReport,
}

//
// ─── ACTIVE SESSION ────────────────────────────────────────────────────────────
//

/// A running session for one learner.
///
/// Wraps the queue engine together with the session-local scheduling ledger.
/// The ledger starts from whatever states were loaded at session start and
/// always keeps the latest local grade per word, so repeated judgments of the
/// same word within a session chain correctly even when writes are failing.
#[derive(Debug)]
pub struct ActiveSession {
    user_id: UserId,
    session: ReviewSession,
    review_states: HashMap<WordId, ReviewState>,
}

impl ActiveSession {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.session.current_card()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    #[must_use]
    pub fn round_number(&self) -> u32 {
        self.session.round_number()
    }

    #[must_use]
    pub fn round_length(&self) -> usize {
        self.session.round_length()
    }

    #[must_use]
    pub fn round_position(&self) -> usize {
        self.session.round_position()
    }

    #[must_use]
    pub fn counts(&self) -> DeckCounts {
        self.session.counts()
    }

    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.session.deck_size()
    }

    /// Latest scheduling state for a word, local grades included.
    #[must_use]
    pub fn review_state(&self, word_id: WordId) -> Option<ReviewState> {
        self.review_states.get(&word_id).copied()
    }
}

//
// ─── WORKFLOW ──────────────────────────────────────────────────────────────────
//

/// Orchestrates session start, judging, and write-through persistence.
#[derive(Clone)]
pub struct SessionWorkflow {
    clock: Clock,
    flashcards: Arc<dyn FlashcardStore>,
    review_states: Arc<dyn ReviewStateStore>,
    settings: SessionSettings,
}

impl SessionWorkflow {
    #[must_use]
    pub fn new(
        clock: Clock,
        flashcards: Arc<dyn FlashcardStore>,
        review_states: Arc<dyn ReviewStateStore>,
    ) -> Self {
        Self {
            clock,
            flashcards,
            review_states,
            settings: SessionSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Load a learner's deck and start a session over it.
    ///
    /// Unlike the write-through path, load failures here are fatal: a session
    /// cannot start without its deck.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyDeck` if the learner has no flashcards,
    /// `SessionError::Storage` if the deck or ledger cannot be read, and
    /// `SessionError::Flashcard`/`SessionError::Review` if a stored record
    /// fails validation.
    pub async fn start_session(&self, user_id: UserId) -> Result<ActiveSession, SessionError> {
        let records = self.flashcards.load_deck(user_id).await?;
        let mut cards = records
            .into_iter()
            .map(FlashcardRecord::into_flashcard)
            .collect::<Result<Vec<Flashcard>, _>>()?;

        if self.settings.shuffle_deck() {
            let mut rng = rng();
            cards.as_mut_slice().shuffle(&mut rng);
        }

        let review_states = if self.settings.scheduling_enabled() {
            self.load_review_ledger(user_id).await?
        } else {
            HashMap::new()
        };

        let session = ReviewSession::new(cards)?;
        Ok(ActiveSession {
            user_id,
            session,
            review_states,
        })
    }

    async fn load_review_ledger(
        &self,
        user_id: UserId,
    ) -> Result<HashMap<WordId, ReviewState>, SessionError> {
        let mut ledger = HashMap::new();
        for record in self.review_states.load_review_states(user_id).await? {
            ledger.insert(record.word_id, record.into_state()?);
        }
        Ok(ledger)
    }

    /// Judge the current flashcard and write the outcome through.
    ///
    /// The in-memory transition happens first and is the source of truth:
    /// engine rejections return an error before anything is written, and
    /// writes that fail afterwards land in the report instead of rolling the
    /// session back.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished,
    /// or `SessionError::OutOfOrderJudgment` if `id` is not the current card.
    pub async fn judge(
        &self,
        active: &mut ActiveSession,
        id: FlashcardId,
        judgment: Judgment,
    ) -> Result<JudgeResult, SessionError> {
        let card = active.session.judge(id, judgment)?;

        let mut writes = PersistenceReport::default();
        if let Err(error) = self
            .flashcards
            .save_disposition(card.flashcard_id, card.disposition)
            .await
        {
            writes.record(WriteOp::SaveDisposition, error);
        }

        let review = if self.settings.scheduling_enabled() {
            let graded = self.grade_word(active, card.word_id, judgment);

            let record = ReviewStateRecord::from_state(
                active.user_id,
                card.word_id,
                graded.state,
                graded.due_at,
            );
            if let Err(error) = self.review_states.save_review_state(&record).await {
                writes.record(WriteOp::SaveReviewState, error);
            }
            Some(graded)
        } else {
            None
        };

        Ok(JudgeResult {
            card,
            review,
            writes,
        })
    }

    fn grade_word(
        &self,
        active: &mut ActiveSession,
        word_id: WordId,
        judgment: Judgment,
    ) -> GradedReview {
        let review_service = ReviewService::new()
            .with_clock(self.clock)
            .with_initial_state(self.settings.initial_review_state());

        let previous = active.review_states.get(&word_id).copied();
        let graded = review_service.grade(judgment, previous);
        active.review_states.insert(word_id, graded.state);
        graded
    }

    /// Reset the session and write the cleared deck through.
    ///
    /// The in-memory reset always succeeds; a failed deck write lands in the
    /// report. Scheduling state is left alone, a deck reset starts the drill
    /// over without losing long-term review history.
    pub async fn reset_session(&self, active: &mut ActiveSession) -> PersistenceReport {
        active.session.reset();

        let mut writes = PersistenceReport::default();
        if let Err(error) = self.flashcards.reset_deck(active.user_id).await {
            writes.record(WriteOp::ResetDeck, error);
        }
        writes
    }
}
