//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use coach_core::RuleSet;

/// Environment variable listing extra CORS origins (comma-separated)
pub const ALLOWED_ORIGINS_ENV_VAR: &str = "COACH_ALLOWED_ORIGINS";

pub async fn cmd_serve(
    rules: RuleSet,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting coach card server...");
    println!(
        "   Rules: {} categories, {} triggers",
        rules.len(),
        rules.trigger_count()
    );
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let allowed_origins = parse_origins(&std::env::var(ALLOWED_ORIGINS_ENV_VAR).unwrap_or_default());
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} ({})",
            allowed_origins.join(", "),
            ALLOWED_ORIGINS_ENV_VAR
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let config = coach_server::ServerConfig { allowed_origins };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;

    coach_server::serve_with_config(rules, host, port, static_dir_str, config).await?;

    Ok(())
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
