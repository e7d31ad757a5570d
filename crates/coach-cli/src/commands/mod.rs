//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `classify` - Transcript classification and card output
//! - `rules` - Rule table listing, testing, validation, and rule loading
//! - `serve` - Web server command

pub mod classify;
pub mod rules;
pub mod serve;

// Re-export command functions for main.rs
pub use classify::*;
pub use rules::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
