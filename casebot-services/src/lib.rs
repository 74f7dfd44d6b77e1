//! Run orchestration for the AI money case bot
//!
//! This crate wires the source adapters and the extraction engine into a
//! single run, renders the digest, delivers it to Telegram and persists
//! the extracted cases to the case table and the notes directory.

pub mod aggregator;
pub mod digest;
pub mod notes;
pub mod persistence;
pub mod pipeline;
pub mod supabase;
pub mod telegram;

pub use aggregator::Aggregator;
pub use digest::{difficulty_bar, render_digest};
pub use notes::{sanitize_title, NoteWriter};
pub use persistence::{PersistenceReport, PersistenceSink};
pub use pipeline::{Pipeline, RunOutcome};
pub use supabase::{SupabaseConfig, SupabaseStore};
pub use telegram::{DigestSender, TelegramSender};
