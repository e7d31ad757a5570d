//! Coach Core Library
//!
//! Shared functionality for the coach card tool:
//! - Trigger rule table with embedded defaults and file overrides
//! - Transcript CSV decoding
//! - Trigger classification into coach cards
//! - Card export (CSV and JSON)
//! - Session state for hosts that keep a file loaded

pub mod classify;
pub mod error;
pub mod export;
pub mod models;
pub mod rules;
pub mod session;
pub mod transcript;

pub use classify::{classify, classify_with_policy, match_content, TriggerMatch};
pub use error::{Error, Result};
pub use export::{export_cards, CsvStyle, ExportFormat, DOWNLOAD_FILE_NAME};
pub use models::{
    CoachCard, Language, MatchPolicy, ResponseText, TranscriptRow, TriggerRule, CONTENT_FIELD,
};
pub use rules::RuleSet;
pub use session::{CoachSession, LoadSummary};
pub use transcript::{parse_transcripts, parse_transcripts_or_empty};
