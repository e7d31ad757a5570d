//! Rule table command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coach_core::rules::{default_rules_path, RULES_ENV_VAR};
use coach_core::{match_content, RuleSet};

use super::truncate;

/// Load the rule table: --rules, then $COACH_RULES, then override/embedded
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    let env_path = std::env::var(RULES_ENV_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);
    let path = path.map(Path::to_path_buf).or(env_path);

    RuleSet::load(path.as_deref()).context("Failed to load trigger rules")
}

pub fn cmd_rules_list(rules: &RuleSet) -> Result<()> {
    println!();
    println!(
        "🎯 Trigger rules ({} categories, {} triggers)",
        rules.len(),
        rules.trigger_count()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for (i, rule) in rules.rules().iter().enumerate() {
        let name = if rule.name() != rule.category {
            format!("{} ({})", rule.category, rule.name())
        } else {
            rule.category.clone()
        };
        let languages = rule.responses.keys().cloned().collect::<Vec<_>>().join(", ");
        println!("   {:>2}. {} [{}]", i + 1, name, languages);
        println!("       {}", truncate(&rule.triggers.join(", "), 72));
    }

    Ok(())
}

pub fn cmd_rules_test(rules: &RuleSet, text: &str, language: &str) -> Result<()> {
    match match_content(text, rules) {
        Some(found) => {
            println!("✅ Matched '{}'", found.rule.category);
            println!("   Trigger: {}", found.trigger);
            println!(
                "   Rep response ({}): {}",
                rules.language(language).label,
                rules.response_for(found.rule, &rules.language(language).code)
            );
        }
        None => {
            println!("❌ No trigger found in: {}", truncate(text, 60));
        }
    }

    Ok(())
}

pub fn cmd_rules_check(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rules = RuleSet::from_toml_str(&content)
        .with_context(|| format!("Invalid rule table: {}", path.display()))?;

    println!(
        "✅ {} is valid: {} categories, {} triggers, {} languages",
        path.display(),
        rules.len(),
        rules.trigger_count(),
        rules.languages().len()
    );
    Ok(())
}

pub fn cmd_rules_path() -> Result<()> {
    match default_rules_path() {
        Some(path) => {
            let state = if path.exists() { "present" } else { "not present" };
            println!("{} ({})", path.display(), state);
        }
        None => println!("No data directory available on this platform"),
    }
    Ok(())
}

pub fn cmd_languages(rules: &RuleSet) -> Result<()> {
    let default = rules.default_language();
    for language in rules.languages() {
        let marker = if language.code == default.code {
            " (default)"
        } else {
            ""
        };
        println!("   {:<4} {}{}", language.code, language.label, marker);
    }
    Ok(())
}
