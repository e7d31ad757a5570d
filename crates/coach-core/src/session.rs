//! Coach session state
//!
//! Holds what one upload session needs: the active language, the rows of the
//! loaded file, the cards built from them and an optional category filter.
//! The host owns the session and passes the rule table in on every call, so
//! several sessions can share one table.

use std::io::Read;

use serde::Serialize;
use tracing::info;

use crate::classify::classify_with_policy;
use crate::models::{CoachCard, MatchPolicy, TranscriptRow, CONTENT_FIELD};
use crate::rules::RuleSet;
use crate::transcript::parse_transcripts_or_empty;

/// Outcome of loading a file into a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows: usize,
    pub cards: usize,
    /// Decode failure message; the session is empty when this is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

/// Session state for one loaded transcript file
#[derive(Debug, Clone, Default)]
pub struct CoachSession {
    language: String,
    policy: MatchPolicy,
    /// Message column for `load_csv` (None reads `content`)
    content_column: Option<String>,
    rows: Vec<TranscriptRow>,
    cards: Vec<CoachCard>,
    filter: Option<String>,
}

impl CoachSession {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read customer messages from a column other than `content`
    pub fn with_content_column(mut self, column: impl Into<String>) -> Self {
        self.content_column = Some(column.into());
        self
    }

    /// Decode a transcript CSV and classify it, replacing any loaded data
    ///
    /// Undecodable input leaves the session empty rather than failing.
    pub fn load_csv<R: Read>(&mut self, rules: &RuleSet, reader: R) -> LoadSummary {
        let column = self.content_column.as_deref().unwrap_or(CONTENT_FIELD);
        let (rows, decode_error) = parse_transcripts_or_empty(reader, column);
        self.load_rows(rules, rows);

        LoadSummary {
            rows: self.rows.len(),
            cards: self.cards.len(),
            decode_error,
        }
    }

    /// Replace loaded rows and classify them
    pub fn load_rows(&mut self, rules: &RuleSet, rows: Vec<TranscriptRow>) {
        self.rows = rows;
        self.filter = None;
        self.reclassify(rules);
        info!(
            "Loaded {} rows, {} coach cards ({})",
            self.rows.len(),
            self.cards.len(),
            self.language
        );
    }

    /// Switch language and rebuild cards from the loaded rows
    pub fn set_language(&mut self, rules: &RuleSet, language: impl Into<String>) {
        self.language = language.into();
        self.reclassify(rules);
    }

    /// Show only cards of one category (None shows all)
    pub fn set_filter(&mut self, category: Option<String>) {
        self.filter = category;
    }

    /// Drop loaded rows and cards, keeping the language
    pub fn reset(&mut self) {
        self.rows.clear();
        self.cards.clear();
        self.filter = None;
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn rows(&self) -> &[TranscriptRow] {
        &self.rows
    }

    /// All cards, ignoring the filter
    pub fn cards(&self) -> &[CoachCard] {
        &self.cards
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Cards passing the category filter
    pub fn visible_cards(&self) -> Vec<&CoachCard> {
        self.cards
            .iter()
            .filter(|card| match &self.filter {
                Some(category) => &card.category == category,
                None => true,
            })
            .collect()
    }

    /// Categories present in the cards, in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for card in &self.cards {
            if !seen.contains(&card.category.as_str()) {
                seen.push(&card.category);
            }
        }
        seen
    }

    fn reclassify(&mut self, rules: &RuleSet) {
        self.cards = classify_with_policy(&self.rows, rules, &self.language, self.policy);
    }
}
