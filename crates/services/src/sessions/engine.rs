use std::fmt;

use vocab_core::model::{Disposition, Flashcard, FlashcardId, Judgment, WordId};

use super::progress::DeckCounts;
use crate::error::SessionError;

//
// ─── JUDGED CARD ───────────────────────────────────────────────────────────────
//

/// Outcome of judging the head of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgedCard {
    pub flashcard_id: FlashcardId,
    pub word_id: WordId,
    pub disposition: Disposition,
    pub round_completed: bool,
    pub is_finished: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory review loop over one learner's deck.
///
/// Each round walks the active queue in order, and a judgment applies to the
/// head card only. When the queue is exhausted the active set is rebuilt from
/// dispositions: cards still pending or still-learning come back for another
/// round, cards marked know drop out. The session finishes when a round ends
/// with nothing left to requeue. There is no retry cap; a card returns round
/// after round until the learner knows it.
pub struct ReviewSession {
    cards: Vec<Flashcard>,
    queue: Vec<usize>,
    cursor: usize,
    round: u32,
    finished: bool,
}

fn active_queue(cards: &[Flashcard]) -> Vec<usize> {
    cards
        .iter()
        .enumerate()
        .filter(|(_, card)| card.disposition() != Disposition::Know)
        .map(|(index, _)| index)
        .collect()
}

impl ReviewSession {
    /// Start a session over the given deck, in the order provided.
    ///
    /// Cards already marked know are excluded from the first round. A deck
    /// where every card is known starts in the finished state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyDeck` if no cards are provided.
    pub fn new(cards: Vec<Flashcard>) -> Result<Self, SessionError> {
        if cards.is_empty() {
            return Err(SessionError::EmptyDeck);
        }

        let queue = active_queue(&cards);
        let finished = queue.is_empty();

        Ok(Self {
            cards,
            queue,
            cursor: 0,
            round: 1,
            finished,
        })
    }

    /// The card a judgment currently applies to, if the session is running.
    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        if self.finished {
            return None;
        }
        self.queue.get(self.cursor).map(|&index| &self.cards[index])
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Round counter, starting at 1. It does not advance when the session
    /// finishes, so a deck cleared in one pass still reports round 1.
    #[must_use]
    pub fn round_number(&self) -> u32 {
        self.round
    }

    /// Number of cards queued for the current round.
    #[must_use]
    pub fn round_length(&self) -> usize {
        self.queue.len()
    }

    /// Cards already judged in the current round.
    #[must_use]
    pub fn round_position(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    /// Whole-deck disposition tally, independent of the current queue.
    #[must_use]
    pub fn counts(&self) -> DeckCounts {
        let mut counts = DeckCounts::default();
        for card in &self.cards {
            match card.disposition() {
                Disposition::Pending => counts.pending += 1,
                Disposition::StillLearning => counts.still_learning += 1,
                Disposition::Know => counts.know += 1,
            }
        }
        counts
    }

    /// Apply a judgment to the head of the queue and advance.
    ///
    /// Judgments are strictly in order: `id` must match the current card.
    /// The active set is only recomputed when the round's queue is exhausted,
    /// so a card judged know mid-round still counts toward the current
    /// round's length and drops out at the boundary.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished,
    /// or `SessionError::OutOfOrderJudgment` if `id` is not the current card.
    /// Neither rejection changes any state.
    pub fn judge(
        &mut self,
        id: FlashcardId,
        judgment: Judgment,
    ) -> Result<JudgedCard, SessionError> {
        let Some(current) = self.current_card() else {
            return Err(SessionError::Completed);
        };
        let expected = current.id();
        if expected != id {
            return Err(SessionError::OutOfOrderJudgment {
                expected,
                submitted: id,
            });
        }

        let index = self.queue[self.cursor];
        let card = &mut self.cards[index];
        card.apply_judgment(judgment);
        let (flashcard_id, word_id, disposition) = (card.id(), card.word_id(), card.disposition());

        self.cursor += 1;
        let round_completed = self.cursor >= self.queue.len();
        if round_completed {
            self.advance_round();
        }

        Ok(JudgedCard {
            flashcard_id,
            word_id,
            disposition,
            round_completed,
            is_finished: self.finished,
        })
    }

    /// Return every card to pending and start over from round 1.
    ///
    /// Resetting twice is the same as resetting once.
    pub fn reset(&mut self) {
        for card in &mut self.cards {
            card.reset_disposition();
        }
        self.queue = active_queue(&self.cards);
        self.cursor = 0;
        self.round = 1;
        self.finished = false;
    }

    fn advance_round(&mut self) {
        self.queue = active_queue(&self.cards);
        self.cursor = 0;
        if self.queue.is_empty() {
            self.finished = true;
        } else {
            self.round += 1;
        }
    }
}

impl fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewSession")
            .field("deck_size", &self.cards.len())
            .field("round", &self.round)
            .field("round_length", &self.queue.len())
            .field("cursor", &self.cursor)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
