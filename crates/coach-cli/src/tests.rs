//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use coach_core::RuleSet;
use tempfile::{NamedTempFile, TempDir};

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate, ClassifyOptions, OutputFormat};

const TRANSCRIPT: &str = "call_id,content\n\
    1,\"Our budget, honestly, is tight\"\n\
    2,Just checking in\n\
    3,Can we schedule a kickoff?\n\
    4,The contract price looks off\n";

fn transcript_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn rules() -> RuleSet {
    RuleSet::embedded().unwrap()
}

fn opts(format: OutputFormat) -> ClassifyOptions {
    ClassifyOptions {
        format,
        ..Default::default()
    }
}

// ========== Classify Command Tests ==========

#[test]
fn test_classify_text_output() {
    let file = transcript_file(TRANSCRIPT);
    let out = commands::classify_file(&rules(), file.path(), &opts(OutputFormat::Text)).unwrap();

    assert!(out.contains("Coach cards in English (3 cards from 4 rows)"));
    assert!(out.contains("Trigger: budget"));
    assert!(out.contains("Trigger: kickoff"));
    assert!(!out.contains("Just checking in"));
}

#[test]
fn test_classify_legacy_csv_output() {
    let file = transcript_file(TRANSCRIPT);
    let out = commands::classify_file(&rules(), file.path(), &opts(OutputFormat::Csv)).unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(
        lines[0],
        "Name,Language,Description,Rep Response,Trigger Phrase,Customer Quote"
    );
    assert_eq!(lines.len(), 4);
    // Legacy layout does not quote the comma-laden customer quote
    assert!(lines[1].ends_with(",budget,Our budget, honestly, is tight"));
}

#[test]
fn test_classify_quoted_csv_output() {
    let file = transcript_file(TRANSCRIPT);
    let options = ClassifyOptions {
        format: OutputFormat::Csv,
        quoted: true,
        ..Default::default()
    };
    let out = commands::classify_file(&rules(), file.path(), &options).unwrap();

    assert!(out.contains(",budget,\"Our budget, honestly, is tight\""));
}

#[test]
fn test_classify_json_multiple_languages() {
    let file = transcript_file(TRANSCRIPT);
    let options = ClassifyOptions {
        languages: vec!["en".to_string(), "es".to_string()],
        format: OutputFormat::Json,
        ..Default::default()
    };
    let out = commands::classify_file(&rules(), file.path(), &options).unwrap();

    let cards: serde_json::Value = serde_json::from_str(&out).unwrap();
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 6);
    assert_eq!(cards[0]["language"], "en");
    assert_eq!(cards[3]["language"], "es");
    assert_eq!(cards[0]["trigger"], cards[3]["trigger"]);
}

#[test]
fn test_classify_category_filter() {
    let file = transcript_file(TRANSCRIPT);
    let options = ClassifyOptions {
        category: Some("Onboarding".to_string()),
        format: OutputFormat::Json,
        ..Default::default()
    };
    let out = commands::classify_file(&rules(), file.path(), &options).unwrap();

    let cards: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(cards.as_array().unwrap().len(), 1);
    assert_eq!(cards[0]["trigger"], "kickoff");
}

#[test]
fn test_classify_every_category() {
    let file = transcript_file(TRANSCRIPT);
    let options = ClassifyOptions {
        every_category: true,
        format: OutputFormat::Json,
        ..Default::default()
    };
    let out = commands::classify_file(&rules(), file.path(), &options).unwrap();

    let cards: serde_json::Value = serde_json::from_str(&out).unwrap();
    // "The contract price looks off" hits both Cost/Price and Contract Claim
    assert_eq!(cards.as_array().unwrap().len(), 4);
}

#[test]
fn test_classify_undecodable_file_is_empty() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"content\n\xff\xfe budget\n").unwrap();

    let out = commands::classify_file(&rules(), file.path(), &opts(OutputFormat::Text)).unwrap();
    assert!(out.contains("No coach cards (0 rows scanned)"));
}

#[test]
fn test_classify_missing_file() {
    let result = commands::classify_file(
        &rules(),
        &PathBuf::from("/no/such/transcript.csv"),
        &opts(OutputFormat::Text),
    );
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Failed to open file"));
}

#[test]
fn test_classify_named_content_column() {
    let file = transcript_file("speaker,text\ncustomer,that is too expensive\n");

    let default =
        commands::classify_file(&rules(), file.path(), &opts(OutputFormat::Text)).unwrap();
    assert!(default.contains("No coach cards (1 rows scanned)"));

    let options = ClassifyOptions {
        content_column: "text".to_string(),
        ..Default::default()
    };
    let out = commands::classify_file(&rules(), file.path(), &options).unwrap();
    assert!(out.contains("(1 cards from 1 rows)"));
    assert!(out.contains("Trigger: expensive"));
}

#[test]
fn test_content_column_flag_parses() {
    let cli = Cli::try_parse_from([
        "coach",
        "classify",
        "-f",
        "calls.csv",
        "--content-column",
        "text",
    ])
    .unwrap();

    match cli.command {
        Commands::Classify { content_column, .. } => assert_eq!(content_column, "text"),
        _ => panic!("expected classify command"),
    }

    let cli = Cli::try_parse_from(["coach", "classify", "-f", "calls.csv"]).unwrap();
    match cli.command {
        Commands::Classify { content_column, .. } => assert_eq!(content_column, "content"),
        _ => panic!("expected classify command"),
    }
}

#[test]
fn test_cmd_classify_writes_output_file() {
    let file = transcript_file(TRANSCRIPT);
    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("live_coach_cards.csv");

    commands::cmd_classify(
        &rules(),
        file.path(),
        &opts(OutputFormat::Csv),
        Some(&out_path),
    )
    .unwrap();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.starts_with("Name,Language,"));
    assert_eq!(written.lines().count(), 4);
}

#[test]
fn test_output_format_parse() {
    assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
    assert!("yaml".parse::<OutputFormat>().is_err());
}

// ========== Rules Command Tests ==========

#[test]
fn test_load_rules_explicit_path() {
    let file = transcript_file(
        r#"
[[rules]]
category = "Urgency"
triggers = ["asap"]
[rules.responses]
en = "What date are you working toward?"
"#,
    );

    let rules = commands::load_rules(Some(file.path())).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules.rules()[0].category, "Urgency");
}

#[test]
fn test_load_rules_invalid_file() {
    let file = transcript_file("[[rules]]\ncategory = \"Broken\"\n");
    let result = commands::load_rules(Some(file.path()));
    assert!(result.is_err());
}

#[test]
fn test_cmd_rules_list() {
    assert!(commands::cmd_rules_list(&rules()).is_ok());
}

#[test]
fn test_cmd_rules_test() {
    assert!(commands::cmd_rules_test(&rules(), "That's TOO EXPENSIVE", "es").is_ok());
    assert!(commands::cmd_rules_test(&rules(), "hello", "en").is_ok());
}

#[test]
fn test_cmd_rules_check() {
    let good = transcript_file(
        "[[rules]]\ncategory = \"A\"\ntriggers = [\"a\"]\n[rules.responses]\nen = \"ok\"\n",
    );
    assert!(commands::cmd_rules_check(good.path()).is_ok());

    let bad = transcript_file("[[rules]]\ncategory = \"A\"\ntriggers = [\"a\"]\n");
    let err = commands::cmd_rules_check(bad.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid rule table"));
}

#[test]
fn test_cmd_languages() {
    assert!(commands::cmd_languages(&rules()).is_ok());
}

// ========== Utility Tests ==========

#[test]
fn test_parse_origins() {
    assert_eq!(
        commands::parse_origins(" http://a.test, ,http://b.test "),
        vec!["http://a.test".to_string(), "http://b.test".to_string()]
    );
    assert!(commands::parse_origins("").is_empty());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly 10", 10), "exactly 10");
    assert_eq!(truncate("this is a long string", 10), "this is...");
    assert_eq!(truncate("¿Podrías compartir?", 8), "¿Podr...");
}
