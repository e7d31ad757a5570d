//! Trigger rule table
//!
//! The rule table is an ordered list of categories, each with ordered trigger
//! phrases and per-language responses, plus the list of languages a card can
//! be rendered in.
//!
//! ## Configuration Resolution
//!
//! The table is loaded with a three-layer resolution:
//! 1. An explicit path (`--rules`, `COACH_RULES`)
//! 2. An override in the data dir (~/.local/share/coachcards/config/rules.toml)
//! 3. The embedded default (compiled into binary)
//!
//! Every table is validated when it is loaded. A table that loads is safe to
//! classify with: each rule has triggers and a default-language response.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Language, ResponseText, TriggerRule};

/// Embedded default rule table (compiled into binary)
const DEFAULT_RULES: &str = include_str!("../../../config/rules.toml");

/// Language used when a table does not name one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Environment variable naming a rule table file
pub const RULES_ENV_VAR: &str = "COACH_RULES";

/// A validated, ordered rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<TriggerRule>,
    languages: Vec<Language>,
    default_language: String,
}

impl RuleSet {
    /// Build a rule table, normalizing triggers to lowercase and validating
    pub fn new(
        rules: Vec<TriggerRule>,
        languages: Vec<Language>,
        default_language: impl Into<String>,
    ) -> Result<Self> {
        let default_language = default_language.into();
        let rules = rules.into_iter().map(normalize_rule).collect::<Vec<_>>();

        validate_languages(&languages, &default_language)?;
        validate_rules(&rules, &languages, &default_language)?;

        Ok(Self {
            rules,
            languages,
            default_language,
        })
    }

    /// Build a table with English as the only language
    pub fn from_rules(rules: Vec<TriggerRule>) -> Result<Self> {
        Self::new(
            rules,
            vec![Language::new(DEFAULT_LANGUAGE, "English")],
            DEFAULT_LANGUAGE,
        )
    }

    /// The default table compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_RULES)
    }

    /// Load the table (explicit path first, then override, then embedded)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => {
                debug!("Loading rules from {}", path.display());
                read_rules_file(path)?
            }
            None => match default_rules_path().filter(|p| p.exists()) {
                Some(override_path) => {
                    debug!("Loading rules override from {}", override_path.display());
                    read_rules_file(&override_path)?
                }
                None => {
                    debug!("Using embedded default rules");
                    DEFAULT_RULES.to_string()
                }
            },
        };

        let rules = Self::from_toml_str(&content)?;
        info!(
            "Loaded {} rules ({} triggers, {} languages)",
            rules.len(),
            rules.trigger_count(),
            rules.languages.len()
        );
        Ok(rules)
    }

    /// Parse and validate a TOML rule table
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawRuleTable = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid rules TOML: {}", e)))?;

        let default_language = raw
            .default_language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let languages = match raw.languages {
            Some(list) => list
                .into_iter()
                .map(|l| Language::new(l.code, l.label))
                .collect(),
            None => {
                let label = if default_language == DEFAULT_LANGUAGE {
                    "English".to_string()
                } else {
                    default_language.clone()
                };
                vec![Language::new(default_language.clone(), label)]
            }
        };

        let rules = raw
            .rules
            .into_iter()
            .map(|r| TriggerRule {
                category: r.category,
                display_name: r.display_name,
                triggers: r.triggers,
                responses: r.responses,
            })
            .collect();

        Self::new(rules, languages, default_language)
    }

    /// Rules in match priority order
    pub fn rules(&self) -> &[TriggerRule] {
        &self.rules
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn default_language(&self) -> &Language {
        self.languages
            .iter()
            .find(|l| l.code == self.default_language)
            .unwrap_or(&self.languages[0])
    }

    /// Resolve a language code, falling back to the default language
    pub fn language(&self, code: &str) -> &Language {
        self.languages
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(code.trim()))
            .unwrap_or_else(|| self.default_language())
    }

    /// Response for a rule in a language, falling back to the default language
    pub fn response_for<'a>(&'a self, rule: &'a TriggerRule, code: &str) -> &'a str {
        rule.response(code)
            .or_else(|| rule.response(&self.default_language))
            .unwrap_or_default()
    }

    pub fn rule(&self, category: &str) -> Option<&TriggerRule> {
        self.rules.iter().find(|r| r.category == category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn trigger_count(&self) -> usize {
        self.rules.iter().map(|r| r.triggers.len()).sum()
    }
}

/// Default rules override path
pub fn default_rules_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("coachcards").join("config").join("rules.toml"))
}

fn read_rules_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read rules {}: {}", path.display(), e)))
}

fn normalize_rule(mut rule: TriggerRule) -> TriggerRule {
    for trigger in &mut rule.triggers {
        if trigger.chars().any(char::is_uppercase) {
            let lowered = trigger.to_lowercase();
            debug!("Lowercased trigger '{}' in '{}'", trigger, rule.category);
            *trigger = lowered;
        }
    }
    rule
}

fn validate_languages(languages: &[Language], default_language: &str) -> Result<()> {
    if languages.is_empty() {
        return Err(Error::Config("No languages configured".into()));
    }

    let mut seen = HashSet::new();
    for language in languages {
        if language.code.trim().is_empty() {
            return Err(Error::Config("Language with empty code".into()));
        }
        if !seen.insert(language.code.to_lowercase()) {
            return Err(Error::Config(format!(
                "Duplicate language code: {}",
                language.code
            )));
        }
    }

    if !languages.iter().any(|l| l.code == default_language) {
        return Err(Error::Config(format!(
            "Default language '{}' is not in the language list",
            default_language
        )));
    }

    Ok(())
}

fn validate_rules(
    rules: &[TriggerRule],
    languages: &[Language],
    default_language: &str,
) -> Result<()> {
    if rules.is_empty() {
        return Err(Error::Config("Rule table has no rules".into()));
    }

    let mut categories = HashSet::new();
    for rule in rules {
        if rule.category.trim().is_empty() {
            return Err(Error::Config("Rule with empty category".into()));
        }
        if !categories.insert(rule.category.as_str()) {
            return Err(Error::Config(format!(
                "Duplicate category: {}",
                rule.category
            )));
        }

        if rule.triggers.is_empty() {
            return Err(Error::Config(format!(
                "Category '{}' has no triggers",
                rule.category
            )));
        }
        let mut triggers = HashSet::new();
        for trigger in &rule.triggers {
            if trigger.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Category '{}' has an empty trigger",
                    rule.category
                )));
            }
            if !triggers.insert(trigger.as_str()) {
                return Err(Error::Config(format!(
                    "Category '{}' lists trigger '{}' twice",
                    rule.category, trigger
                )));
            }
        }

        for (code, response) in &rule.responses {
            match response.primary() {
                Some(text) if !text.trim().is_empty() => {}
                _ => {
                    return Err(Error::Config(format!(
                        "Category '{}' has an empty '{}' response",
                        rule.category, code
                    )))
                }
            }
        }
        if rule.response(default_language).is_none() {
            return Err(Error::Config(format!(
                "Category '{}' has no '{}' response",
                rule.category, default_language
            )));
        }
        if let Some(code) = rule
            .responses
            .keys()
            .find(|code| !languages.iter().any(|l| &l.code == *code))
        {
            return Err(Error::Config(format!(
                "Category '{}' has a '{}' response but '{}' is not a configured language",
                rule.category, code, code
            )));
        }
    }

    Ok(())
}

/// Raw rule table structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawRuleTable {
    default_language: Option<String>,
    languages: Option<Vec<RawLanguage>>,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawLanguage {
    code: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    category: String,
    display_name: Option<String>,
    #[serde(default)]
    triggers: Vec<String>,
    #[serde(default)]
    responses: BTreeMap<String, ResponseText>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal_table(extra: &str) -> String {
        format!(
            r#"
[[rules]]
category = "Cost/Price"
triggers = ["price", "budget"]
[rules.responses]
en = "Tell me about your budget."
{}
"#,
            extra
        )
    }

    #[test]
    fn test_parse_embedded_rules() {
        let rules = RuleSet::embedded().unwrap();
        assert_eq!(rules.rules()[0].category, "Cost/Price");
        assert_eq!(rules.default_language().code, "en");
        assert!(rules.rule("Onboarding").is_some());
        assert!(rules.languages().iter().any(|l| l.code == "es"));
    }

    #[test]
    fn test_embedded_rules_keep_file_order() {
        let rules = RuleSet::embedded().unwrap();
        let categories: Vec<&str> = rules.rules().iter().map(|r| r.category.as_str()).collect();
        assert_eq!(
            &categories[..4],
            &["Cost/Price", "Price Complaints", "Contract Claim", "Contract Time"]
        );
    }

    #[test]
    fn test_minimal_table_defaults_to_english() {
        let rules = RuleSet::from_toml_str(&minimal_table("")).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.default_language().label, "English");
        assert_eq!(rules.trigger_count(), 2);
    }

    #[test]
    fn test_triggers_are_lowercased() {
        let table = r#"
[[rules]]
category = "Price Complaints"
triggers = ["Our CFO will never approve that"]
[rules.responses]
en = "Understood."
"#;
        let rules = RuleSet::from_toml_str(table).unwrap();
        assert_eq!(
            rules.rules()[0].triggers[0],
            "our cfo will never approve that"
        );
    }

    #[test]
    fn test_language_fallback() {
        let rules = RuleSet::embedded().unwrap();
        assert_eq!(rules.language("es").label, "Español");
        assert_eq!(rules.language("ES").code, "es");
        assert_eq!(rules.language("xx").label, "English");
        assert_eq!(rules.language("").code, "en");
    }

    #[test]
    fn test_response_fallback() {
        let rules = RuleSet::embedded().unwrap();
        let cost = rules.rule("Cost/Price").unwrap();
        assert!(rules.response_for(cost, "es").starts_with("¿Podrías"));
        assert!(rules.response_for(cost, "xx").starts_with("Can you share"));

        // Deutsch is a known language but Contract Claim has no German text
        let claim = rules.rule("Contract Claim").unwrap();
        assert_eq!(
            rules.response_for(claim, "de"),
            rules.response_for(claim, "en")
        );
    }

    #[test]
    fn test_response_candidates_use_first() {
        let rules = RuleSet::embedded().unwrap();
        let onboarding = rules.rule("Onboarding").unwrap();
        assert!(rules
            .response_for(onboarding, "en")
            .starts_with("Would you like a preview"));
    }

    #[test]
    fn test_reject_empty_triggers() {
        let table = r#"
[[rules]]
category = "Empty"
triggers = []
[rules.responses]
en = "Never shown."
"#;
        let err = RuleSet::from_toml_str(table).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("no triggers"));
    }

    #[test]
    fn test_reject_blank_trigger() {
        let rules = vec![TriggerRule::new("Cost/Price", ["price", "  "]).with_response("en", "x")];
        let err = RuleSet::from_rules(rules).unwrap_err();
        assert!(err.to_string().contains("empty trigger"));
    }

    #[test]
    fn test_reject_duplicate_trigger_after_lowercasing() {
        let rules =
            vec![TriggerRule::new("Cost/Price", ["price", "PRICE"]).with_response("en", "x")];
        let err = RuleSet::from_rules(rules).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_reject_missing_default_response() {
        let rules = vec![TriggerRule::new("Cost/Price", ["price"]).with_response("es", "hola")];
        let err = RuleSet::from_rules(rules).unwrap_err();
        assert!(err.to_string().contains("no 'en' response"));
    }

    #[test]
    fn test_reject_empty_candidate_list() {
        let rules = vec![TriggerRule::new("Cost/Price", ["price"])
            .with_response("en", "ok")
            .with_response("es", Vec::<String>::new())];
        let err = RuleSet::from_rules(rules).unwrap_err();
        assert!(err.to_string().contains("empty 'es' response"));
    }

    #[test]
    fn test_reject_response_for_unlisted_language() {
        let table = minimal_table("pt = \"Fale-me do seu orçamento.\"");
        let err = RuleSet::from_toml_str(&table).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("'pt' is not a configured language"));
    }

    #[test]
    fn test_response_for_listed_language_is_accepted() {
        let table = format!(
            "[[languages]]\ncode = \"en\"\nlabel = \"English\"\n\n\
             [[languages]]\ncode = \"pt\"\nlabel = \"Português\"\n{}",
            minimal_table("pt = \"Fale-me do seu orçamento.\"")
        );
        let rules = RuleSet::from_toml_str(&table).unwrap();
        assert!(!rules.is_empty());
        let cost = rules.rule("Cost/Price").unwrap();
        assert_eq!(rules.response_for(cost, "pt"), "Fale-me do seu orçamento.");
    }

    #[test]
    fn test_reject_duplicate_category() {
        let rules = vec![
            TriggerRule::new("Cost/Price", ["price"]).with_response("en", "a"),
            TriggerRule::new("Cost/Price", ["budget"]).with_response("en", "b"),
        ];
        let err = RuleSet::from_rules(rules).unwrap_err();
        assert!(err.to_string().contains("Duplicate category"));
    }

    #[test]
    fn test_reject_no_rules() {
        let err = RuleSet::from_rules(vec![]).unwrap_err();
        assert!(err.to_string().contains("no rules"));
    }

    #[test]
    fn test_reject_unknown_default_language() {
        let table = format!(
            "default_language = \"fr\"\n[[languages]]\ncode = \"en\"\nlabel = \"English\"\n{}",
            minimal_table("")
        );
        let err = RuleSet::from_toml_str(&table).unwrap_err();
        assert!(err.to_string().contains("not in the language list"));
    }

    #[test]
    fn test_reject_duplicate_language() {
        let err = RuleSet::new(
            vec![TriggerRule::new("Cost/Price", ["price"]).with_response("en", "a")],
            vec![Language::new("en", "English"), Language::new("EN", "English")],
            "en",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate language"));
    }

    #[test]
    fn test_reject_invalid_toml() {
        let err = RuleSet::from_toml_str("rules = 3").unwrap_err();
        assert!(err.to_string().contains("Invalid rules TOML"));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(minimal_table("").as_bytes()).unwrap();

        let rules = RuleSet::load(Some(file.path())).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].triggers, vec!["price", "budget"]);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = RuleSet::load(Some(Path::new("/definitely/not/here/rules.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
