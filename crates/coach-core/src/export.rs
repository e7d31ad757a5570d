//! Export of coach cards for download
//!
//! Supports:
//! - CSV in the legacy download layout (bare comma joins, no escaping)
//! - CSV with proper quoting of commas, quotes and newlines
//! - JSON array of cards

use crate::error::Result;
use crate::models::CoachCard;

/// File name offered for downloads
pub const DOWNLOAD_FILE_NAME: &str = "live_coach_cards.csv";

/// Header row of the download CSV
pub const CSV_HEADER: [&str; 6] = [
    "Name",
    "Language",
    "Description",
    "Rep Response",
    "Trigger Phrase",
    "Customer Quote",
];

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field handling for CSV export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvStyle {
    /// Fields joined with bare commas, as in the first download layout.
    /// Commas or newlines inside a quote or response break the column layout.
    #[default]
    Legacy,
    /// Fields containing commas, quotes or newlines are quoted
    Quoted,
}

/// Render cards as CSV text
///
/// Lines are joined with `\n` and there is no trailing newline.
pub fn export_cards_csv(cards: &[CoachCard], style: CsvStyle) -> String {
    let mut lines = Vec::with_capacity(cards.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for card in cards {
        let fields = [
            card.name.as_str(),
            card.language_label.as_str(),
            card.description.as_str(),
            card.rep_response.as_str(),
            card.trigger.as_str(),
            card.quote.as_str(),
        ];
        let line = match style {
            CsvStyle::Legacy => fields.join(","),
            CsvStyle::Quoted => fields
                .iter()
                .map(|f| escape_csv_field(f))
                .collect::<Vec<_>>()
                .join(","),
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Render cards as a pretty-printed JSON array
pub fn export_cards_json(cards: &[CoachCard]) -> Result<String> {
    Ok(serde_json::to_string_pretty(cards)?)
}

/// Render cards in the requested format
pub fn export_cards(cards: &[CoachCard], format: ExportFormat, style: CsvStyle) -> Result<String> {
    match format {
        ExportFormat::Csv => Ok(export_cards_csv(cards, style)),
        ExportFormat::Json => export_cards_json(cards),
    }
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
