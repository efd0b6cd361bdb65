use crate::model::{MIN_EASE_FACTOR, Quality, ReviewState};

//
// ─── SCHEDULING ────────────────────────────────────────────────────────────────
//

/// Computes the next review state from a graded recall, per SM-2.
///
/// The ease factor moves first: `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)` is
/// added to the previous ease and the result is floored at
/// [`MIN_EASE_FACTOR`]. The interval then follows the ladder:
///
/// * failing recall (`quality < 3`) restarts at 1 day, whatever came before;
/// * a card never reviewed before (interval 0) gets 1 day;
/// * a card at 1 day jumps to 6 days;
/// * everything else scales by the *new* ease factor, rounded half away
///   from zero (`f64::round`).
///
/// Quality is validated upstream: [`Quality::from_u8`] rejects out-of-range
/// grades rather than clamping them, so this function is total.
///
/// # Examples
///
/// ```
/// # use vocab_core::model::{Quality, ReviewState};
/// # use vocab_core::scheduler::compute_next_review;
/// let first = compute_next_review(Quality::Perfect, ReviewState::fresh());
/// assert_eq!(first.interval_days(), 1);
///
/// let second = compute_next_review(Quality::Perfect, first);
/// assert_eq!(second.interval_days(), 6);
///
/// let lapse = compute_next_review(Quality::Incorrect, second);
/// assert_eq!(lapse.interval_days(), 1);
/// ```
#[must_use]
pub fn compute_next_review(quality: Quality, previous: ReviewState) -> ReviewState {
    let ease_factor = next_ease_factor(quality, previous.ease_factor());

    let interval_days = if !quality.is_passing() {
        1
    } else {
        match previous.interval_days() {
            0 => 1,
            1 => 6,
            days => scaled_interval(days, ease_factor),
        }
    };

    ReviewState::from_raw(interval_days, ease_factor)
}

fn next_ease_factor(quality: Quality, previous_ease: f64) -> f64 {
    let spread = f64::from(5 - quality.value());
    let adjusted = previous_ease + (0.1 - spread * (0.08 + spread * 0.02));
    adjusted.max(MIN_EASE_FACTOR)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_interval(previous_days: u32, ease_factor: f64) -> u32 {
    let scaled = (f64::from(previous_days) * ease_factor).round();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
