#![forbid(unsafe_code)]

pub mod error;
pub mod review_service;
pub mod sessions;

pub use vocab_core::Clock;
pub use sessions as session;

pub use error::SessionError;
pub use review_service::{GradedReview, ReviewService};

pub use sessions::{
    ActiveSession, DeckCounts, JudgeResult, JudgedCard, PersistenceReport, ReviewSession,
    SessionWorkflow, WriteFailure, WriteOp,
};
