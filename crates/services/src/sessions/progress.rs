/// Whole-deck tally of dispositions, useful for progress display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeckCounts {
    pub pending: usize,
    pub still_learning: usize,
    pub know: usize,
}

impl DeckCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.pending + self.still_learning + self.know
    }

    /// Cards the learner has not mastered yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending + self.still_learning
    }
}
