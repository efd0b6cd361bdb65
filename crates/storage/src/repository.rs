use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use vocab_core::model::{
    Disposition, Flashcard, FlashcardError, FlashcardId, ReviewError, ReviewState, UserId, Word,
    WordId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a flashcard and the word it drills.
///
/// This mirrors the domain `Flashcard` so repositories can serialize/deserialize
/// without leaking storage concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardRecord {
    pub id: FlashcardId,
    pub user_id: UserId,
    pub word_id: WordId,
    pub term: String,
    pub definition: String,
    pub part_of_speech: Option<String>,
    pub example: Option<String>,
    pub disposition: Disposition,
}

impl FlashcardRecord {
    #[must_use]
    pub fn from_flashcard(user_id: UserId, flashcard: &Flashcard) -> Self {
        let word = flashcard.word();
        Self {
            id: flashcard.id(),
            user_id,
            word_id: word.id(),
            term: word.term().to_owned(),
            definition: word.definition().to_owned(),
            part_of_speech: word.part_of_speech().map(str::to_owned),
            example: word.example().map(str::to_owned),
            disposition: flashcard.disposition(),
        }
    }

    /// Convert the record back into a domain `Flashcard`.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError` if the stored term or definition fails validation.
    pub fn into_flashcard(self) -> Result<Flashcard, FlashcardError> {
        let mut word = Word::new(self.word_id, self.term, self.definition)?;
        if let Some(part_of_speech) = self.part_of_speech {
            word = word.with_part_of_speech(part_of_speech);
        }
        if let Some(example) = self.example {
            word = word.with_example(example);
        }

        Ok(Flashcard::from_persisted(self.id, word, self.disposition))
    }
}

/// Persisted shape for a word's spaced-repetition state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStateRecord {
    pub user_id: UserId,
    pub word_id: WordId,
    pub interval_days: u32,
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewStateRecord {
    #[must_use]
    pub fn from_state(
        user_id: UserId,
        word_id: WordId,
        state: ReviewState,
        next_review_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            word_id,
            interval_days: state.interval_days(),
            ease_factor: state.ease_factor(),
            next_review_at,
        }
    }

    /// Rebuild the domain `ReviewState` from stored values.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError` if the stored ease factor is below the floor
    /// or not finite.
    pub fn into_state(&self) -> Result<ReviewState, ReviewError> {
        ReviewState::new(self.interval_days, self.ease_factor)
    }
}

/// Repository contract for a learner's flashcard deck.
#[async_trait]
pub trait FlashcardStore: Send + Sync {
    /// Load the full deck for a learner, ordered by flashcard id.
    ///
    /// Learners with no stored deck get an empty vec, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deck cannot be read.
    async fn load_deck(&self, user_id: UserId) -> Result<Vec<FlashcardRecord>, StorageError>;

    /// Persist the judged disposition for one flashcard.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the flashcard does not exist,
    /// or other storage errors.
    async fn save_disposition(
        &self,
        id: FlashcardId,
        disposition: Disposition,
    ) -> Result<(), StorageError>;

    /// Return every flashcard in a learner's deck to the pending disposition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deck cannot be updated.
    async fn reset_deck(&self, user_id: UserId) -> Result<(), StorageError>;

    /// Persist or update a flashcard.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the flashcard cannot be stored.
    async fn upsert_flashcard(&self, record: &FlashcardRecord) -> Result<(), StorageError>;
}

/// Repository contract for per-word scheduling state.
#[async_trait]
pub trait ReviewStateStore: Send + Sync {
    /// Load all scheduling state recorded for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the states cannot be read.
    async fn load_review_states(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ReviewStateRecord>, StorageError>;

    /// Persist or update the scheduling state for one word.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be stored.
    async fn save_review_state(&self, record: &ReviewStateRecord) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    flashcards: Arc<Mutex<HashMap<FlashcardId, FlashcardRecord>>>,
    review_states: Arc<Mutex<HashMap<(UserId, WordId), ReviewStateRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flashcards: Arc::new(Mutex::new(HashMap::new())),
            review_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl FlashcardStore for InMemoryRepository {
    async fn load_deck(&self, user_id: UserId) -> Result<Vec<FlashcardRecord>, StorageError> {
        let guard = self
            .flashcards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut deck: Vec<FlashcardRecord> = guard
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        deck.sort_by_key(|record| record.id);
        Ok(deck)
    }

    async fn save_disposition(
        &self,
        id: FlashcardId,
        disposition: Disposition,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .flashcards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        record.disposition = disposition;
        Ok(())
    }

    async fn reset_deck(&self, user_id: UserId) -> Result<(), StorageError> {
        let mut guard = self
            .flashcards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for record in guard.values_mut().filter(|r| r.user_id == user_id) {
            record.disposition = Disposition::Pending;
        }
        Ok(())
    }

    async fn upsert_flashcard(&self, record: &FlashcardRecord) -> Result<(), StorageError> {
        let mut guard = self
            .flashcards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.id, record.clone());
        Ok(())
    }
}

#[async_trait]
impl ReviewStateStore for InMemoryRepository {
    async fn load_review_states(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ReviewStateRecord>, StorageError> {
        let guard = self
            .review_states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save_review_state(&self, record: &ReviewStateRecord) -> Result<(), StorageError> {
        let mut guard = self
            .review_states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert((record.user_id, record.word_id), record.clone());
        Ok(())
    }
}

/// Aggregates flashcard and review-state stores behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub flashcards: Arc<dyn FlashcardStore>,
    pub review_states: Arc<dyn ReviewStateStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let flashcards: Arc<dyn FlashcardStore> = Arc::new(repo.clone());
        let review_states: Arc<dyn ReviewStateStore> = Arc::new(repo);
        Self {
            flashcards,
            review_states,
        }
    }
}
