mod engine;
mod progress;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use engine::{JudgedCard, ReviewSession};
pub use progress::DeckCounts;
pub use workflow::{
    ActiveSession, JudgeResult, PersistenceReport, SessionWorkflow, WriteFailure, WriteOp,
};
