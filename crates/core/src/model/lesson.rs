use thiserror::Error;

use crate::model::ids::LessonId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("unknown lesson: {0}")]
    UnknownLesson(LessonId),

    #[error("lesson {0} is still locked")]
    Locked(LessonId),
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Tally of correct/incorrect answers across one lesson quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonScore {
    correct: u32,
    incorrect: u32,
}

impl LessonScore {
    #[must_use]
    pub fn new(correct: u32, incorrect: u32) -> Self {
        Self { correct, incorrect }
    }

    pub fn record_correct(&mut self) {
        self.correct = self.correct.saturating_add(1);
    }

    pub fn record_incorrect(&mut self) {
        self.incorrect = self.incorrect.saturating_add(1);
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    /// Accuracy as a rounded percentage (0-100). An empty tally scores 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        ((f64::from(self.correct) / f64::from(total)) * 100.0).round() as u8
    }

    /// Star rating for the lesson: one star for finishing, up to five for a
    /// perfect run (thresholds at >60, >80, >90, and exactly 100 percent).
    #[must_use]
    pub fn stars(&self) -> u8 {
        let percent = self.percent();
        if percent == 100 {
            5
        } else if percent > 90 {
            4
        } else if percent > 80 {
            3
        } else if percent > 60 {
            2
        } else {
            1
        }
    }

    /// Experience points awarded for completing the lesson with this score:
    /// a flat 50 plus half the accuracy percentage.
    #[must_use]
    pub fn xp_reward(&self) -> u32 {
        50 + u32::from(self.percent()) / 2
    }
}

//
// ─── TRACK ─────────────────────────────────────────────────────────────────────
//

/// One lesson's slot in a learner's track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonEntry {
    id: LessonId,
    completed: bool,
    locked: bool,
    score_percent: Option<u8>,
    stars: Option<u8>,
}

impl LessonEntry {
    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn score_percent(&self) -> Option<u8> {
        self.score_percent
    }

    #[must_use]
    pub fn stars(&self) -> Option<u8> {
        self.stars
    }
}

/// Result of completing a lesson: the recorded score plus what it unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedLesson {
    pub lesson_id: LessonId,
    pub score_percent: u8,
    pub stars: u8,
    pub xp_gained: u32,
    pub unlocked_next: Option<LessonId>,
}

/// Ordered sequence of lessons with sequential unlocking.
///
/// The first lesson starts unlocked; each completion unlocks the next slot.
/// Retaking an unlocked lesson is allowed and overwrites its recorded score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonTrack {
    lessons: Vec<LessonEntry>,
}

impl LessonTrack {
    /// Builds a track from ordered lesson ids.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = LessonId>) -> Self {
        let lessons = ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| LessonEntry {
                id,
                completed: false,
                locked: index != 0,
                score_percent: None,
                stars: None,
            })
            .collect();

        Self { lessons }
    }

    #[must_use]
    pub fn entries(&self) -> &[LessonEntry] {
        &self.lessons
    }

    #[must_use]
    pub fn entry(&self, id: LessonId) -> Option<&LessonEntry> {
        self.lessons.iter().find(|entry| entry.id == id)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.lessons.iter().filter(|entry| entry.completed).count()
    }

    /// Records a finished lesson and unlocks the next one.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::UnknownLesson` if the id is not in the track and
    /// `LessonError::Locked` if the lesson has not been unlocked yet.
    pub fn complete(
        &mut self,
        id: LessonId,
        score: LessonScore,
    ) -> Result<CompletedLesson, LessonError> {
        let index = self
            .lessons
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(LessonError::UnknownLesson(id))?;

        if self.lessons[index].locked {
            return Err(LessonError::Locked(id));
        }

        let score_percent = score.percent();
        let stars = score.stars();

        let entry = &mut self.lessons[index];
        entry.completed = true;
        entry.score_percent = Some(score_percent);
        entry.stars = Some(stars);

        let unlocked_next = match self.lessons.get_mut(index + 1) {
            Some(next) if next.locked => {
                next.locked = false;
                Some(next.id)
            }
            _ => None,
        };

        Ok(CompletedLesson {
            lesson_id: id,
            score_percent,
            stars,
            xp_gained: score.xp_reward(),
            unlocked_next,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
