//! Domain models for coach card classification

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Name of the transcript column holding the customer's message
pub const CONTENT_FIELD: &str = "content";

/// One transcript record: field name -> value
///
/// Only `content` is read by the classifier; other columns are carried along
/// untouched. When transcripts keep the message in another column, the
/// decoder copies it into `content`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptRow {
    fields: HashMap<String, String>,
}

impl TranscriptRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row with only a `content` field
    pub fn from_content(content: impl Into<String>) -> Self {
        Self::new().with_field(CONTENT_FIELD, content)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The customer's message, or "" when the column is absent
    pub fn content(&self) -> &str {
        self.get(CONTENT_FIELD).unwrap_or_default()
    }
}

impl FromIterator<(String, String)> for TranscriptRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A selectable response language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Short code used to look up responses (e.g. "en", "es")
    pub code: String,
    /// Human-readable label shown on cards (e.g. "English", "Español")
    pub label: String,
}

impl Language {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Response text for one language: a single string or ranked candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseText {
    One(String),
    Candidates(Vec<String>),
}

impl ResponseText {
    /// The text used on cards (first candidate for lists)
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::One(text) => Some(text.as_str()),
            Self::Candidates(list) => list.first().map(String::as_str),
        }
    }
}

impl From<&str> for ResponseText {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for ResponseText {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for ResponseText {
    fn from(list: Vec<String>) -> Self {
        Self::Candidates(list)
    }
}

/// A named category of trigger phrases sharing one suggested response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Phrases in match priority order
    pub triggers: Vec<String>,
    /// Language code -> response
    pub responses: BTreeMap<String, ResponseText>,
}

impl TriggerRule {
    pub fn new<I, S>(category: impl Into<String>, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category: category.into(),
            display_name: None,
            triggers: triggers.into_iter().map(Into::into).collect(),
            responses: BTreeMap::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_response(mut self, code: impl Into<String>, text: impl Into<ResponseText>) -> Self {
        self.responses.insert(code.into(), text.into());
        self
    }

    /// Display name, falling back to the category
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.category)
    }

    /// Response for exactly this language code, if configured
    pub fn response(&self, code: &str) -> Option<&str> {
        self.responses.get(code).and_then(ResponseText::primary)
    }

    /// First trigger contained in already-lowercased text
    pub fn first_trigger_in(&self, lowered: &str) -> Option<&str> {
        self.triggers
            .iter()
            .map(String::as_str)
            .find(|trigger| lowered.contains(trigger))
    }
}

/// One classification result surfaced to a sales rep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachCard {
    pub category: String,
    pub name: String,
    /// Language code in effect when the card was built
    pub language: String,
    pub language_label: String,
    pub description: String,
    pub rep_response: String,
    /// The configured phrase that matched
    pub trigger: String,
    /// Original, unmodified row content
    pub quote: String,
}

/// How many cards a single row may produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Stop at the first matching category
    #[default]
    FirstMatch,
    /// One card for every matching category, in rule order
    EveryCategory,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstMatch => "first_match",
            Self::EveryCategory => "every_category",
        }
    }
}

impl std::str::FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first_match" | "first" => Ok(Self::FirstMatch),
            "every_category" | "every" | "all" => Ok(Self::EveryCategory),
            _ => Err(format!("Unknown match policy: {}", s)),
        }
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
