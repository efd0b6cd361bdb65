//! Domain model: words, flashcards, review state, lessons, and identifiers.

mod flashcard;
mod ids;
mod lesson;
mod review;
mod settings;

pub use flashcard::{Disposition, Flashcard, FlashcardError, Word};
pub use ids::{FlashcardId, LessonId, ParseIdError, UserId, WordId};
pub use lesson::{CompletedLesson, LessonEntry, LessonError, LessonScore, LessonTrack};
pub use review::{
    DEFAULT_EASE_FACTOR, Judgment, MIN_EASE_FACTOR, Quality, ReviewError, ReviewState,
};
pub use settings::SessionSettings;
