//! Schedule ingestion from a spreadsheet export.
//!
//! The sheet has a header row and three columns: timestamp, game number
//! and expected outcome (`date_heure,numero,victoire`). Rows with an empty
//! cell are dropped. Outcome labels are free text; anything not naming the
//! banker side counts as player.

use std::path::Path;

use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Outcome, ScheduleRow};

/// Read and parse a schedule file.
pub async fn read_schedule(path: impl AsRef<Path>) -> DomainResult<Vec<ScheduleRow>> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
        DomainError::ScheduleImport {
            line: 0,
            reason: format!("cannot read {}: {err}", path.display()),
        }
    })?;
    parse_schedule(&raw)
}

/// Parse schedule text. The first non-empty line is the header.
pub fn parse_schedule(raw: &str) -> DomainResult<Vec<ScheduleRow>> {
    let mut rows = Vec::new();
    let mut lines = raw
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Ok(rows);
    };
    let delimiter = sniff_delimiter(header);

    for (index, line) in lines {
        let line_no = index + 1;
        let fields = split_line(line, delimiter).ok_or_else(|| DomainError::ScheduleImport {
            line: line_no,
            reason: "unclosed quote".to_string(),
        })?;
        if fields.len() < 3 || fields.iter().take(3).any(|f| f.trim().is_empty()) {
            debug!(line = line_no, "skipping incomplete schedule row");
            continue;
        }

        let identifier = parse_identifier(&fields[1]).ok_or_else(|| DomainError::ScheduleImport {
            line: line_no,
            reason: format!("invalid game number '{}'", fields[1].trim()),
        })?;
        let outcome = Outcome::from_label(&fields[2]).unwrap_or_else(|| {
            warn!(line = line_no, label = %fields[2].trim(), "unknown outcome label, using player");
            Outcome::Player
        });

        rows.push(ScheduleRow {
            identifier,
            scheduled_at: fields[0].trim().to_string(),
            outcome,
        });
    }
    Ok(rows)
}

/// Spreadsheet exports write whole numbers either bare or as `881.0`.
fn parse_identifier(field: &str) -> Option<u64> {
    let field = field.trim();
    field
        .parse::<u64>()
        .ok()
        .or_else(|| field.strip_suffix(".0").and_then(|f| f.parse().ok()))
}

fn sniff_delimiter(header: &str) -> char {
    [';', '\t']
        .into_iter()
        .find(|d| header.contains(*d) && !header.contains(','))
        .unwrap_or(',')
}

/// Split one line into fields, honouring double quotes (`""` escapes a
/// quote). Returns `None` for an unclosed quote.
fn split_line(line: &str, delimiter: char) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    if quoted {
        return None;
    }
    fields.push(field);
    Some(fields)
}
