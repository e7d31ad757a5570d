//! Trigger classification
//!
//! A single pass over the rows: each row's content is lowercased once, then
//! rules are scanned in table order and triggers in rule order. The first
//! trigger contained in the content decides the row's card.
//!
//! Classification has no state of its own. The same rows can be classified
//! again with another language and only the language-dependent card fields
//! change.

use tracing::debug;

use crate::models::{CoachCard, MatchPolicy, TranscriptRow, TriggerRule};
use crate::rules::RuleSet;

/// The rule and trigger a piece of content hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerMatch<'a> {
    pub rule: &'a TriggerRule,
    pub trigger: &'a str,
}

/// Classify rows into coach cards, one card at most per row
pub fn classify(rows: &[TranscriptRow], rules: &RuleSet, language: &str) -> Vec<CoachCard> {
    classify_with_policy(rows, rules, language, MatchPolicy::FirstMatch)
}

/// Classify rows into coach cards under an explicit match policy
///
/// Cards come back in row order. Rows that match nothing produce nothing.
pub fn classify_with_policy(
    rows: &[TranscriptRow],
    rules: &RuleSet,
    language: &str,
    policy: MatchPolicy,
) -> Vec<CoachCard> {
    let mut cards = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let content = row.content();
        let lowered = content.to_lowercase();

        for found in matches_in(&lowered, rules) {
            debug!(
                row = index,
                category = %found.rule.category,
                trigger = found.trigger,
                "Trigger matched"
            );
            cards.push(build_card(found, content, rules, language));

            if policy == MatchPolicy::FirstMatch {
                break;
            }
        }
    }

    debug!(
        "Classified {} rows into {} cards ({})",
        rows.len(),
        cards.len(),
        policy
    );
    cards
}

/// Find the rule and trigger a piece of content would be carded under
pub fn match_content<'a>(content: &str, rules: &'a RuleSet) -> Option<TriggerMatch<'a>> {
    let lowered = content.to_lowercase();
    let found = matches_in(&lowered, rules).next();
    found
}

/// Every matching rule for lowercased content, in table order
fn matches_in<'a, 'c>(
    lowered: &'c str,
    rules: &'a RuleSet,
) -> impl Iterator<Item = TriggerMatch<'a>> + 'c
where
    'a: 'c,
{
    rules.rules().iter().filter_map(move |rule| {
        rule.first_trigger_in(lowered)
            .map(|trigger| TriggerMatch { rule, trigger })
    })
}

fn build_card(found: TriggerMatch<'_>, quote: &str, rules: &RuleSet, language: &str) -> CoachCard {
    let rule = found.rule;
    let lang = rules.language(language);

    CoachCard {
        category: rule.category.clone(),
        name: rule.name().to_string(),
        language: lang.code.clone(),
        language_label: lang.label.clone(),
        description: describe(found.trigger, &rule.category),
        rep_response: rules.response_for(rule, &lang.code).to_string(),
        trigger: found.trigger.to_string(),
        quote: quote.to_string(),
    }
}

/// Card description for a matched trigger
pub fn describe(trigger: &str, category: &str) -> String {
    format!(
        "Triggers when a customer mentions {} indicating {}.",
        trigger,
        category.to_lowercase()
    )
}
