//! Classify command implementation

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use coach_core::export::{export_cards_csv, export_cards_json, CsvStyle};
use coach_core::{CoachCard, CoachSession, MatchPolicy, RuleSet, CONTENT_FIELD};
use tracing::warn;

use super::truncate;

/// Output format for classified cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Unknown output format: {} (use text, csv, or json)",
                s
            )),
        }
    }
}

/// Options for the classify command
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Languages to render, in order (at least one)
    pub languages: Vec<String>,
    pub category: Option<String>,
    /// CSV column holding the customer's message
    pub content_column: String,
    pub format: OutputFormat,
    pub quoted: bool,
    pub every_category: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            category: None,
            content_column: CONTENT_FIELD.to_string(),
            format: OutputFormat::Text,
            quoted: false,
            every_category: false,
        }
    }
}

pub fn cmd_classify(
    rules: &RuleSet,
    file: &Path,
    opts: &ClassifyOptions,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = classify_file(rules, file, opts)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("💾 Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Load, classify and render a transcript file
pub fn classify_file(rules: &RuleSet, file: &Path, opts: &ClassifyOptions) -> Result<String> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    let first_language = opts
        .languages
        .first()
        .cloned()
        .unwrap_or_else(|| rules.default_language().code.clone());
    let policy = if opts.every_category {
        MatchPolicy::EveryCategory
    } else {
        MatchPolicy::FirstMatch
    };

    eprintln!("📥 Classifying {}...", file.display());

    let mut session = CoachSession::new(first_language)
        .with_policy(policy)
        .with_content_column(opts.content_column.as_str());
    let summary = session.load_csv(rules, BufReader::new(csv_file));
    if let Some(err) = &summary.decode_error {
        eprintln!("   ⚠️  Could not decode CSV ({}); treating it as empty", err);
    }
    eprintln!(
        "   {} rows, {} coach cards",
        summary.rows, summary.cards
    );

    if let Some(category) = &opts.category {
        if rules.rule(category).is_none() {
            warn!("No rule named '{}'; nothing will be shown", category);
        }
        session.set_filter(Some(category.clone()));
    }

    let mut sections: Vec<Vec<CoachCard>> = Vec::new();
    for (i, language) in opts.languages.iter().enumerate() {
        if i > 0 {
            session.set_language(rules, language.as_str());
        }
        sections.push(session.visible_cards().into_iter().cloned().collect());
    }
    if sections.is_empty() {
        sections.push(session.visible_cards().into_iter().cloned().collect());
    }

    render(&sections, summary.rows, opts)
}

fn render(sections: &[Vec<CoachCard>], rows: usize, opts: &ClassifyOptions) -> Result<String> {
    let all: Vec<CoachCard> = sections.iter().flatten().cloned().collect();

    match opts.format {
        OutputFormat::Csv => {
            let style = if opts.quoted {
                CsvStyle::Quoted
            } else {
                CsvStyle::Legacy
            };
            Ok(export_cards_csv(&all, style))
        }
        OutputFormat::Json => Ok(export_cards_json(&all)?),
        OutputFormat::Text => Ok(sections
            .iter()
            .map(|cards| render_text(cards, rows))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn render_text(cards: &[CoachCard], rows: usize) -> String {
    let mut out = String::new();

    if cards.is_empty() {
        out.push_str(&format!("No coach cards ({} rows scanned)\n", rows));
        return out;
    }

    let label = &cards[0].language_label;
    out.push_str(&format!(
        "\n📋 Coach cards in {} ({} cards from {} rows)\n",
        label,
        cards.len(),
        rows
    ));
    out.push_str("   ─────────────────────────────────────────────────────────────\n");

    for card in cards {
        out.push_str(&format!("   • {} [{}]\n", card.name, card.category));
        out.push_str(&format!("     Trigger: {}\n", card.trigger));
        out.push_str(&format!("     Quote: \"{}\"\n", truncate(&card.quote, 80)));
        out.push_str(&format!("     Rep response: \"{}\"\n", card.rep_response));
    }

    out
}
