//! Coach CLI - Sales coach cards from call transcripts
//!
//! Usage:
//!   coach classify --file calls.csv          Classify a transcript export
//!   coach classify -f calls.csv -l es        Spanish rep responses
//!   coach rules test "that's too expensive"  Check which rule text hits
//!   coach serve --port 3000                  Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Classify {
            file,
            languages,
            category,
            content_column,
            format,
            quoted,
            every_category,
            output,
        } => {
            let rules = commands::load_rules(cli.rules.as_deref())?;
            let opts = commands::ClassifyOptions {
                languages,
                category,
                content_column,
                format: format.parse().map_err(|e: String| anyhow::anyhow!(e))?,
                quoted,
                every_category,
            };
            commands::cmd_classify(&rules, &file, &opts, output.as_deref())
        }
        Commands::Rules { action } => match action {
            None | Some(RulesAction::List) => {
                let rules = commands::load_rules(cli.rules.as_deref())?;
                commands::cmd_rules_list(&rules)
            }
            Some(RulesAction::Test { text, language }) => {
                let rules = commands::load_rules(cli.rules.as_deref())?;
                commands::cmd_rules_test(&rules, &text, &language)
            }
            Some(RulesAction::Check { path }) => commands::cmd_rules_check(&path),
            Some(RulesAction::Path) => commands::cmd_rules_path(),
        },
        Commands::Languages => {
            let rules = commands::load_rules(cli.rules.as_deref())?;
            commands::cmd_languages(&rules)
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            let rules = commands::load_rules(cli.rules.as_deref())?;
            commands::cmd_serve(rules, &host, port, static_dir.as_deref()).await
        }
    }
}
