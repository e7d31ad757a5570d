//! Transcript CSV decoding
//!
//! Turns a transcript export (header row + one record per utterance) into
//! ordered [`TranscriptRow`]s. Only the message column matters for
//! classification; every other column is kept as-is.
//!
//! The message column is `content` unless the caller names another one. A
//! named column is exposed as the row's `content`, and a literal `content`
//! column in the same file is then shadowed.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{TranscriptRow, CONTENT_FIELD};

/// Parse transcript CSV data into rows
///
/// Records may be shorter or longer than the header; missing fields are
/// simply absent from the row. Blank lines are skipped. Header names are
/// trimmed before matching `content_column`.
pub fn parse_transcripts<R: Read>(reader: R, content_column: &str) -> Result<Vec<TranscriptRow>> {
    let content_column = content_column.trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::InvalidData("Transcript CSV has no header row".into()));
    }
    if !headers.iter().any(|h| h == content_column) {
        debug!(
            "Transcript CSV has no '{}' column; every row will be empty",
            content_column
        );
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        rows.push(record_to_row(&headers, &record, content_column));
    }

    debug!("Parsed {} transcript rows", rows.len());
    Ok(rows)
}

/// Parse transcript CSV data, treating undecodable input as "no rows"
///
/// Returns the rows plus the decode error message, if any, so hosts can show
/// an empty result instead of failing.
pub fn parse_transcripts_or_empty<R: Read>(
    reader: R,
    content_column: &str,
) -> (Vec<TranscriptRow>, Option<String>) {
    match parse_transcripts(reader, content_column) {
        Ok(rows) => (rows, None),
        Err(e) => {
            warn!("Failed to decode transcript CSV: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
    }
}

/// Convert a CSV record to a row using headers as keys
fn record_to_row(
    headers: &StringRecord,
    record: &StringRecord,
    content_column: &str,
) -> TranscriptRow {
    let renamed = content_column != CONTENT_FIELD;

    let mut fields: Vec<(String, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !(renamed && *header == CONTENT_FIELD))
        .filter_map(|(i, header)| {
            record
                .get(i)
                .map(|value| (header.to_string(), value.to_string()))
        })
        .collect();

    if renamed {
        let message = fields
            .iter()
            .find(|(name, _)| name == content_column)
            .map(|(_, value)| value.clone());
        if let Some(message) = message {
            fields.push((CONTENT_FIELD.to_string(), message));
        }
    }

    fields.into_iter().collect()
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}
