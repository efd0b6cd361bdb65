#![forbid(unsafe_code)]

//! Domain model and scheduling math for vocabulary review.
//!
//! This crate is pure: it owns no storage, no I/O, and no async. The
//! [`scheduler`] module computes spaced-repetition intervals; [`model`] holds
//! the validated domain types those computations run over.

pub mod model;
pub mod scheduler;
pub mod time;

pub use time::Clock;
