#![forbid(unsafe_code)]

//! Persistence layer: repository contracts, record shapes, and adapters.
//!
//! Domain types stay in `vocab-core`; this crate owns how they are stored
//! and loaded. Service code depends on the [`FlashcardStore`] and
//! [`ReviewStateStore`] traits, never on a concrete backend.

pub mod repository;

pub use repository::{
    FlashcardRecord, FlashcardStore, InMemoryRepository, ReviewStateRecord, ReviewStateStore,
    Storage, StorageError,
};
