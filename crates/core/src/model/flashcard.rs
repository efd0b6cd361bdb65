use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{FlashcardId, WordId};
use crate::model::review::Judgment;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlashcardError {
    #[error("word term cannot be empty")]
    EmptyTerm,

    #[error("word definition cannot be empty")]
    EmptyDefinition,
}

//
// ─── DISPOSITION ───────────────────────────────────────────────────────────────
//

/// Session-scoped verdict tag on a flashcard.
///
/// This is the per-session tri-state, distinct from the long-term
/// interval/ease state the scheduler maintains. `Pending` cards have not been
/// judged this session; `StillLearning` cards stay in rotation; `Know` cards
/// leave the working set at the next round boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Pending,
    StillLearning,
    Know,
}

impl Disposition {
    /// Storage encoding, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Pending => "pending",
            Disposition::StillLearning => "still_learning",
            Disposition::Know => "know",
        }
    }
}

//
// ─── WORD ──────────────────────────────────────────────────────────────────────
//

/// Vocabulary content a flashcard presents.
///
/// The session engine passes words through untouched; only presentation
/// layers read the fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    id: WordId,
    term: String,
    definition: String,
    part_of_speech: Option<String>,
    example: Option<String>,
}

impl Word {
    /// Creates a new word.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError::EmptyTerm` or `FlashcardError::EmptyDefinition`
    /// if either field is empty or whitespace-only.
    pub fn new(
        id: WordId,
        term: impl Into<String>,
        definition: impl Into<String>,
    ) -> Result<Self, FlashcardError> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(FlashcardError::EmptyTerm);
        }

        let definition = definition.into();
        if definition.trim().is_empty() {
            return Err(FlashcardError::EmptyDefinition);
        }

        Ok(Self {
            id,
            term: term.trim().to_owned(),
            definition: definition.trim().to_owned(),
            part_of_speech: None,
            example: None,
        })
    }

    /// Attach a part-of-speech label. Blank values are dropped.
    #[must_use]
    pub fn with_part_of_speech(mut self, part_of_speech: impl Into<String>) -> Self {
        self.part_of_speech = Some(part_of_speech.into())
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        self
    }

    /// Attach an example sentence. Blank values are dropped.
    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into())
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        self
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    #[must_use]
    pub fn part_of_speech(&self) -> Option<&str> {
        self.part_of_speech.as_deref()
    }

    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }
}

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// One word bound to a learner's deck, with its session disposition.
///
/// The flashcard id is distinct from the word id: the word is shared content,
/// the flashcard is one user's per-session record of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    id: FlashcardId,
    word: Word,
    disposition: Disposition,
}

impl Flashcard {
    /// Creates a flashcard that has not been judged yet.
    #[must_use]
    pub fn new(id: FlashcardId, word: Word) -> Self {
        Self {
            id,
            word,
            disposition: Disposition::Pending,
        }
    }

    /// Reconstructs a flashcard from persisted values, disposition included.
    #[must_use]
    pub fn from_persisted(id: FlashcardId, word: Word, disposition: Disposition) -> Self {
        Self {
            id,
            word,
            disposition,
        }
    }

    #[must_use]
    pub fn id(&self) -> FlashcardId {
        self.id
    }

    #[must_use]
    pub fn word(&self) -> &Word {
        &self.word
    }

    /// Id of the underlying vocabulary word.
    #[must_use]
    pub fn word_id(&self) -> WordId {
        self.word.id()
    }

    #[must_use]
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// Records a learner's judgment on this card.
    pub fn apply_judgment(&mut self, judgment: Judgment) {
        self.disposition = judgment.disposition();
    }

    /// Clears the card back to `Pending` for a fresh session.
    pub fn reset_disposition(&mut self) {
        self.disposition = Disposition::Pending;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_word(id: u64) -> Word {
        Word::new(WordId::new(id), "serendipity", "a fortunate accident").unwrap()
    }

    #[test]
    fn word_rejects_blank_term() {
        let err = Word::new(WordId::new(1), "   ", "something").unwrap_err();
        assert_eq!(err, FlashcardError::EmptyTerm);
    }

    #[test]
    fn word_rejects_blank_definition() {
        let err = Word::new(WordId::new(1), "term", "").unwrap_err();
        assert_eq!(err, FlashcardError::EmptyDefinition);
    }

    #[test]
    fn word_trims_fields_and_filters_blank_extras() {
        let word = Word::new(WordId::new(1), "  ephemeral  ", "  short-lived  ")
            .unwrap()
            .with_part_of_speech("adjective")
            .with_example("   ");

        assert_eq!(word.term(), "ephemeral");
        assert_eq!(word.definition(), "short-lived");
        assert_eq!(word.part_of_speech(), Some("adjective"));
        assert_eq!(word.example(), None);
    }

    #[test]
    fn new_flashcard_starts_pending() {
        let card = Flashcard::new(FlashcardId::new(1), build_word(1));
        assert_eq!(card.disposition(), Disposition::Pending);
        assert_eq!(card.word_id(), WordId::new(1));
    }

    #[test]
    fn judgments_move_the_disposition() {
        let mut card = Flashcard::new(FlashcardId::new(1), build_word(1));

        card.apply_judgment(Judgment::StillLearning);
        assert_eq!(card.disposition(), Disposition::StillLearning);

        card.apply_judgment(Judgment::Know);
        assert_eq!(card.disposition(), Disposition::Know);

        card.reset_disposition();
        assert_eq!(card.disposition(), Disposition::Pending);
    }

    #[test]
    fn disposition_encoding_is_snake_case() {
        assert_eq!(Disposition::Pending.as_str(), "pending");
        assert_eq!(Disposition::StillLearning.as_str(), "still_learning");
        assert_eq!(Disposition::Know.as_str(), "know");
    }

    #[test]
    fn from_persisted_keeps_disposition() {
        let card =
            Flashcard::from_persisted(FlashcardId::new(2), build_word(2), Disposition::Know);
        assert_eq!(card.disposition(), Disposition::Know);
    }
}
