//! Core types for the AI money case bot
//!
//! This crate defines the shared data structures used across the bot:
//! the normalized candidates produced by source adapters, the cases
//! extracted from them by the model, and the storage seam used for
//! deduplication and persistence.

pub mod candidate;
pub mod case;
pub mod error;
pub mod store;
pub mod text;

pub use candidate::{Candidate, MAX_EXCERPT_CHARS};
pub use case::{ExtractedCase, StoredCase, MAX_DIFFICULTY, MIN_DIFFICULTY};
pub use error::{CaseBotError, CaseBotResult};
pub use store::{CaseStore, MemoryCaseStore};
