use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use services::{SessionError, SessionWorkflow, WriteOp};
use storage::repository::{
    FlashcardRecord, FlashcardStore, InMemoryRepository, ReviewStateRecord, ReviewStateStore,
    StorageError,
};
use vocab_core::model::{
    Disposition, Flashcard, FlashcardId, Judgment, ReviewState, SessionSettings, UserId, Word,
    WordId,
};
use vocab_core::time::{fixed_clock, fixed_now};

const EPSILON: f64 = 1e-9;

fn build_record(id: u64, user_id: UserId) -> FlashcardRecord {
    let word = Word::new(WordId::new(id), format!("term {id}"), "a meaning").unwrap();
    FlashcardRecord::from_flashcard(user_id, &Flashcard::new(FlashcardId::new(id), word))
}

async fn seed_deck(repo: &InMemoryRepository, user_id: UserId, deck_size: u64) {
    for id in 1..=deck_size {
        repo.upsert_flashcard(&build_record(id, user_id))
            .await
            .unwrap();
    }
}

fn build_workflow(repo: &InMemoryRepository) -> SessionWorkflow {
    SessionWorkflow::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

/// Store double whose writes always fail; reads delegate to the wrapped repo.
#[derive(Clone)]
struct FailingWrites {
    inner: InMemoryRepository,
}

#[async_trait]
impl FlashcardStore for FailingWrites {
    async fn load_deck(&self, user_id: UserId) -> Result<Vec<FlashcardRecord>, StorageError> {
        self.inner.load_deck(user_id).await
    }

    async fn save_disposition(
        &self,
        _id: FlashcardId,
        _disposition: Disposition,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("injected write failure".into()))
    }

    async fn reset_deck(&self, _user_id: UserId) -> Result<(), StorageError> {
        Err(StorageError::Connection("injected write failure".into()))
    }

    async fn upsert_flashcard(&self, record: &FlashcardRecord) -> Result<(), StorageError> {
        self.inner.upsert_flashcard(record).await
    }
}

#[async_trait]
impl ReviewStateStore for FailingWrites {
    async fn load_review_states(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ReviewStateRecord>, StorageError> {
        self.inner.load_review_states(user_id).await
    }

    async fn save_review_state(&self, _record: &ReviewStateRecord) -> Result<(), StorageError> {
        Err(StorageError::Connection("injected write failure".into()))
    }
}

#[tokio::test]
async fn mastery_loop_persists_dispositions_and_states() {
    let repo = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&repo, user_id, 3).await;

    let workflow = build_workflow(&repo);
    let mut session = workflow.start_session(user_id).await.unwrap();

    while !session.is_finished() {
        let id = session.current_card().unwrap().id();
        let result = workflow.judge(&mut session, id, Judgment::Know).await.unwrap();
        assert!(result.writes.is_clean());
    }

    assert_eq!(session.round_number(), 1);
    assert_eq!(session.counts().know, 3);

    let deck = repo.load_deck(user_id).await.unwrap();
    assert!(deck.iter().all(|r| r.disposition == Disposition::Know));

    let states = repo.load_review_states(user_id).await.unwrap();
    assert_eq!(states.len(), 3);
    for state in &states {
        assert_eq!(state.interval_days, 1);
        assert!((state.ease_factor - 2.6).abs() < EPSILON);
        assert_eq!(state.next_review_at, fixed_now() + Duration::days(1));
    }
}

#[tokio::test]
async fn still_learning_then_know_chains_scheduler_state() {
    let repo = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&repo, user_id, 1).await;

    let workflow = build_workflow(&repo);
    let mut session = workflow.start_session(user_id).await.unwrap();

    let id = FlashcardId::new(1);
    let first = workflow
        .judge(&mut session, id, Judgment::StillLearning)
        .await
        .unwrap();
    let graded = first.review.expect("scheduling enabled");
    assert_eq!(graded.state.interval_days(), 1);
    assert!((graded.state.ease_factor() - 2.18).abs() < EPSILON);
    assert_eq!(session.round_number(), 2);

    // The second judgment in the same session chains off the first grade.
    let second = workflow.judge(&mut session, id, Judgment::Know).await.unwrap();
    let graded = second.review.expect("scheduling enabled");
    assert_eq!(graded.state.interval_days(), 6);
    assert!((graded.state.ease_factor() - 2.28).abs() < EPSILON);
    assert!(session.is_finished());

    let states = repo.load_review_states(user_id).await.unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].interval_days, 6);
    assert_eq!(states[0].next_review_at, fixed_now() + Duration::days(6));
}

#[tokio::test]
async fn write_failures_never_block_the_session() {
    let inner = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&inner, user_id, 2).await;

    let failing = FailingWrites {
        inner: inner.clone(),
    };
    let workflow = SessionWorkflow::new(
        fixed_clock(),
        Arc::new(failing.clone()),
        Arc::new(failing),
    );

    let mut session = workflow.start_session(user_id).await.unwrap();
    let id = session.current_card().unwrap().id();
    let result = workflow.judge(&mut session, id, Judgment::Know).await.unwrap();

    // The in-memory transition happened even though both writes failed.
    assert_eq!(session.round_position(), 1);
    assert_eq!(session.counts().know, 1);
    let ledger_state = session.review_state(WordId::new(1)).unwrap();
    assert!((ledger_state.ease_factor() - 2.6).abs() < EPSILON);

    let failures = result.writes.failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].op, WriteOp::SaveDisposition);
    assert_eq!(failures[1].op, WriteOp::SaveReviewState);

    // Judging continues and the session can still finish.
    let id = session.current_card().unwrap().id();
    let result = workflow.judge(&mut session, id, Judgment::Know).await.unwrap();
    assert!(result.card.is_finished);
    assert!(session.is_finished());

    // Nothing leaked into the backing store.
    let deck = inner.load_deck(user_id).await.unwrap();
    assert!(deck.iter().all(|r| r.disposition == Disposition::Pending));
    assert!(inner.load_review_states(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn ledger_chains_across_failed_writes() {
    let inner = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&inner, user_id, 1).await;

    let failing = FailingWrites {
        inner: inner.clone(),
    };
    let workflow = SessionWorkflow::new(
        fixed_clock(),
        Arc::new(failing.clone()),
        Arc::new(failing),
    );

    let mut session = workflow.start_session(user_id).await.unwrap();
    let id = FlashcardId::new(1);

    let first = workflow
        .judge(&mut session, id, Judgment::StillLearning)
        .await
        .unwrap();
    let graded = first.review.expect("scheduling enabled");
    assert_eq!(graded.state.interval_days(), 1);
    assert!((graded.state.ease_factor() - 2.18).abs() < EPSILON);
    assert!(!first.writes.is_clean());

    // The second grade chains off the session ledger, not the (empty) store.
    let second = workflow.judge(&mut session, id, Judgment::Know).await.unwrap();
    let graded = second.review.expect("scheduling enabled");
    assert_eq!(graded.state.interval_days(), 6);
    assert!((graded.state.ease_factor() - 2.28).abs() < EPSILON);

    assert!(inner.load_review_states(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reset_write_failure_never_blocks_the_reset() {
    let inner = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&inner, user_id, 2).await;

    let failing = FailingWrites {
        inner: inner.clone(),
    };
    let workflow = SessionWorkflow::new(
        fixed_clock(),
        Arc::new(failing.clone()),
        Arc::new(failing),
    );

    let mut session = workflow.start_session(user_id).await.unwrap();
    for _ in 0..2 {
        let id = session.current_card().unwrap().id();
        workflow.judge(&mut session, id, Judgment::Know).await.unwrap();
    }
    assert!(session.is_finished());

    let report = workflow.reset_session(&mut session).await;
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].op, WriteOp::ResetDeck);

    // The in-memory reset happened anyway.
    assert!(!session.is_finished());
    assert_eq!(session.round_number(), 1);
    assert_eq!(session.counts().pending, 2);
}

#[tokio::test]
async fn out_of_order_judgment_leaves_everything_untouched() {
    let repo = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&repo, user_id, 2).await;

    let workflow = build_workflow(&repo);
    let mut session = workflow.start_session(user_id).await.unwrap();

    let err = workflow
        .judge(&mut session, FlashcardId::new(2), Judgment::Know)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::OutOfOrderJudgment { expected, submitted }
            if expected == FlashcardId::new(1) && submitted == FlashcardId::new(2)
    ));

    assert_eq!(session.current_card().unwrap().id(), FlashcardId::new(1));
    assert_eq!(session.counts().pending, 2);

    let deck = repo.load_deck(user_id).await.unwrap();
    assert!(deck.iter().all(|r| r.disposition == Disposition::Pending));
    assert!(repo.load_review_states(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reset_clears_dispositions_but_keeps_review_states() {
    let repo = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&repo, user_id, 2).await;

    let workflow = build_workflow(&repo);
    let mut session = workflow.start_session(user_id).await.unwrap();
    for _ in 0..2 {
        let id = session.current_card().unwrap().id();
        workflow.judge(&mut session, id, Judgment::Know).await.unwrap();
    }
    assert!(session.is_finished());

    let report = workflow.reset_session(&mut session).await;
    assert!(report.is_clean());

    assert!(!session.is_finished());
    assert_eq!(session.round_number(), 1);
    assert_eq!(session.counts().pending, 2);

    let deck = repo.load_deck(user_id).await.unwrap();
    assert!(deck.iter().all(|r| r.disposition == Disposition::Pending));

    // Long-term scheduling history survives a deck reset.
    let states = repo.load_review_states(user_id).await.unwrap();
    assert_eq!(states.len(), 2);
}

#[tokio::test]
async fn scheduling_disabled_skips_review_writes() {
    let repo = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&repo, user_id, 1).await;

    let settings = SessionSettings::new(2.5, false, false).unwrap();
    let workflow = build_workflow(&repo).with_settings(settings);

    let mut session = workflow.start_session(user_id).await.unwrap();
    let result = workflow
        .judge(&mut session, FlashcardId::new(1), Judgment::Know)
        .await
        .unwrap();

    assert!(result.review.is_none());
    assert!(result.writes.is_clean());
    assert!(repo.load_review_states(user_id).await.unwrap().is_empty());

    let deck = repo.load_deck(user_id).await.unwrap();
    assert_eq!(deck[0].disposition, Disposition::Know);
}

#[tokio::test]
async fn shuffled_session_still_covers_the_whole_deck() {
    let repo = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&repo, user_id, 5).await;

    let settings = SessionSettings::new(2.5, true, true).unwrap();
    let workflow = build_workflow(&repo).with_settings(settings);
    let mut session = workflow.start_session(user_id).await.unwrap();

    // Shuffling permutes the order but never the working set.
    assert_eq!(session.deck_size(), 5);
    assert_eq!(session.round_length(), 5);
    assert_eq!(session.counts().pending, 5);

    let mut seen = Vec::new();
    while !session.is_finished() {
        let id = session.current_card().unwrap().id();
        let result = workflow.judge(&mut session, id, Judgment::Know).await.unwrap();
        seen.push(result.card.flashcard_id);
    }

    seen.sort();
    let expected: Vec<FlashcardId> = (1..=5).map(FlashcardId::new).collect();
    assert_eq!(seen, expected);
    assert_eq!(session.round_number(), 1);
}

#[tokio::test]
async fn unknown_learner_cannot_start_a_session() {
    let repo = InMemoryRepository::new();
    let workflow = build_workflow(&repo);

    let err = workflow.start_session(UserId::generate()).await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyDeck));
}

#[tokio::test]
async fn persisted_states_hydrate_the_session_ledger() {
    let repo = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&repo, user_id, 1).await;

    let prior = ReviewStateRecord::from_state(
        user_id,
        WordId::new(1),
        ReviewState::new(6, 2.6).unwrap(),
        fixed_now(),
    );
    repo.save_review_state(&prior).await.unwrap();

    let workflow = build_workflow(&repo);
    let mut session = workflow.start_session(user_id).await.unwrap();

    let result = workflow
        .judge(&mut session, FlashcardId::new(1), Judgment::Know)
        .await
        .unwrap();
    let graded = result.review.expect("scheduling enabled");

    // 6 days at ease 2.6 graded perfect: new ease 2.7, 6 * 2.7 rounds to 16.
    assert_eq!(graded.state.interval_days(), 16);
    assert!((graded.state.ease_factor() - 2.7).abs() < EPSILON);
    assert_eq!(graded.due_at, fixed_now() + Duration::days(16));
}

#[tokio::test]
async fn resuming_skips_cards_already_known() {
    let repo = InMemoryRepository::new();
    let user_id = UserId::generate();
    seed_deck(&repo, user_id, 3).await;
    repo.save_disposition(FlashcardId::new(2), Disposition::Know)
        .await
        .unwrap();

    let workflow = build_workflow(&repo);
    let mut session = workflow.start_session(user_id).await.unwrap();

    assert_eq!(session.round_length(), 2);
    assert_eq!(session.counts().know, 1);

    workflow
        .judge(&mut session, FlashcardId::new(1), Judgment::Know)
        .await
        .unwrap();
    assert_eq!(session.current_card().unwrap().id(), FlashcardId::new(3));
}
