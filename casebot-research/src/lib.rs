//! Case extraction for AI monetization digests
//!
//! This crate builds a single bounded prompt from a batch of candidates,
//! asks a Gemini model for a strict JSON array of cases, and maps each
//! returned case back to the candidate it references.

pub mod error;
pub mod extractor;
pub mod gemini;
pub mod prompt;

pub use error::ModelError;
pub use extractor::{CaseExtractor, Extraction, DEFAULT_MAX_CANDIDATES, DEFAULT_QUOTA_DELAY};
pub use gemini::{GeminiClient, GenerativeModel};
pub use prompt::{build_prompt, parse_cases, RawCase};
