//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use vocab_core::model::{FlashcardError, FlashcardId, ReviewError};

/// Errors emitted by session services.
///
/// Write-through persistence failures are deliberately absent: the in-memory
/// session is the source of truth, so failed writes are reported out of band
/// (see `PersistenceReport`) instead of failing the operation. The `Storage`
/// variant covers load paths, where a missing deck really is fatal.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no flashcards available for session")]
    EmptyDeck,

    #[error("session already finished")]
    Completed,

    #[error("expected a judgment for flashcard {expected}, got {submitted}")]
    OutOfOrderJudgment {
        expected: FlashcardId,
        submitted: FlashcardId,
    },

    #[error(transparent)]
    Flashcard(#[from] FlashcardError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
