//! CSV loading for the usage dashboard.
//!
//! Reads the fixed list of source files from the data directory and turns
//! every row into a [`UsageEvent`], tolerating missing files, malformed rows
//! and unparsable timestamps.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use tracing::{debug, info, warn};
use usage_core::error::{DashboardError, Result};
use usage_core::models::UsageEvent;
use usage_core::timestamps::TimestampParser;

/// Source files read from the data directory, in load order.
pub const SOURCE_FILES: &[&str] = &[
    "assembly-takehome1.shortened.csv",
    "assembly-takehome2.shortened.csv",
];

// ── Field aliases ─────────────────────────────────────────────────────────────

/// Logical event field resolved from a CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    CreatedAt,
    CompanyId,
    Type,
    Content,
    Attribute,
    UpdatedAt,
    OriginalTimestamp,
    Value,
}

/// Accepted (lower-cased) header spellings per field, in priority order.
pub const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (Field::Id, &["id", "event_id"]),
    (Field::CreatedAt, &["created_at", "createdat", "created"]),
    (Field::CompanyId, &["company_id", "companyid", "company"]),
    (Field::Type, &["type", "event_type"]),
    (Field::Content, &["content"]),
    (Field::Attribute, &["attribute"]),
    (Field::UpdatedAt, &["updated_at", "updatedat"]),
    (Field::OriginalTimestamp, &["original_timestamp", "originaltimestamp"]),
    (Field::Value, &["value"]),
];

fn aliases(field: Field) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every file in [`SOURCE_FILES`] from `data_path`.
///
/// Fails with [`DashboardError::NoData`] only when no file yields a single
/// event.
pub fn load_events(data_path: &Path) -> Result<Vec<UsageEvent>> {
    load_events_from(data_path, SOURCE_FILES, Utc::now())
}

/// Load `files` (relative to `data_path`) in order, concatenating their
/// events.
///
/// `now` replaces any missing or unparsable `created_at`.
pub fn load_events_from(
    data_path: &Path,
    files: &[&str],
    now: DateTime<Utc>,
) -> Result<Vec<UsageEvent>> {
    let mut all_events: Vec<UsageEvent> = Vec::new();

    for name in files {
        let file_path = data_path.join(name);
        match parse_csv_file(&file_path, now) {
            Ok(events) => all_events.extend(events),
            Err(e) => {
                warn!("Could not parse {}: {}", name, e);
            }
        }
    }

    if all_events.is_empty() {
        return Err(DashboardError::NoData(data_path.to_path_buf()));
    }

    info!(
        "Loaded {} events from {} source files in {}",
        all_events.len(),
        files.len(),
        data_path.display()
    );

    Ok(all_events)
}

/// Open and parse a single CSV file.
pub fn parse_csv_file(file_path: &Path, now: DateTime<Utc>) -> Result<Vec<UsageEvent>> {
    let file = std::fs::File::open(file_path).map_err(|source| DashboardError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;
    parse_csv_reader(file, file_path, now)
}

/// Parse CSV content from any reader; `source` is used for log messages.
///
/// The first row is the header. Whitespace before a field is ignored, so
/// `a, "b, c"` holds two fields. Rows the CSV decoder rejects (for example a
/// field count that differs from the header) are logged and skipped.
pub fn parse_csv_reader<R: Read>(
    mut reader: R,
    source: &Path,
    now: DateTime<Utc>,
) -> Result<Vec<UsageEvent>> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    let content = trim_leading_space(&String::from_utf8_lossy(&raw));

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut events: Vec<UsageEvent> = Vec::new();
    let mut rows_read = 0u64;
    let mut rows_skipped = 0u64;

    for result in csv_reader.records() {
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows_skipped += 1;
                let stop = e.is_io_error();
                let err = DashboardError::MalformedRow {
                    path: source.to_path_buf(),
                    line: e.position().map(|p| p.line()).unwrap_or(0),
                    source: e,
                };
                warn!("{}", err);
                if stop {
                    break;
                }
                continue;
            }
        };

        if is_blank(&record) {
            rows_skipped += 1;
            continue;
        }

        events.push(normalize_record(&headers, &record, now));
    }

    debug!(
        "File {}: {} rows read, {} skipped, {} events",
        source.display(),
        rows_read,
        rows_skipped,
        events.len()
    );

    Ok(events)
}

/// Build a [`UsageEvent`] from one CSV row.
///
/// `headers` must already be trimmed and lower-cased. Values beyond the
/// header length are ignored; unresolved fields become empty strings.
/// `created_at` falls back to `now`, and `updated_at` / `original_timestamp`
/// fall back to `created_at`.
pub fn normalize_record(headers: &[String], record: &StringRecord, now: DateTime<Utc>) -> UsageEvent {
    let row = RowFields { headers, record };

    let created_at = TimestampParser::parse_or(row.get(Field::CreatedAt), now);
    let updated_at = TimestampParser::parse_or(row.get(Field::UpdatedAt), created_at);
    let original_timestamp =
        TimestampParser::parse_or(row.get(Field::OriginalTimestamp), created_at);

    UsageEvent {
        id: row.get(Field::Id).to_string(),
        created_at,
        company_id: row.get(Field::CompanyId).to_string(),
        event_type: row.get(Field::Type).to_string(),
        content: row.get(Field::Content).to_string(),
        attribute: row.get(Field::Attribute).to_string(),
        updated_at,
        original_timestamp,
        value: row.get(Field::Value).to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Header-indexed view over one CSV record.
struct RowFields<'a> {
    headers: &'a [String],
    record: &'a StringRecord,
}

impl<'a> RowFields<'a> {
    /// First non-empty value among the field's aliases, or `""`.
    fn get(&self, field: Field) -> &'a str {
        aliases(field)
            .iter()
            .filter_map(|alias| self.lookup(alias))
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }

    /// Value under header `name`; the last column wins on duplicates.
    fn lookup(&self, name: &str) -> Option<&'a str> {
        let idx = self.headers.iter().rposition(|h| h == name)?;
        self.record.get(idx).map(str::trim)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Unquoted,
    Quoted,
    /// Saw `"` inside a quoted field: closes it unless another `"` follows.
    QuoteInQuoted,
}

/// Drop spaces and tabs at the start of every field outside quotes.
///
/// The `csv` decoder only honours a quote as the very first byte of a field,
/// so without this `e1, "Hello, world"` splits inside the quotes.
fn trim_leading_space(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut state = QuoteState::Unquoted;
    let mut field_start = true;

    for c in input.chars() {
        match state {
            QuoteState::Quoted => {
                if c == '"' {
                    state = QuoteState::QuoteInQuoted;
                }
                out.push(c);
                continue;
            }
            QuoteState::QuoteInQuoted if c == '"' => {
                state = QuoteState::Quoted;
                out.push(c);
                continue;
            }
            _ => state = QuoteState::Unquoted,
        }

        if field_start && (c == ' ' || c == '\t') {
            continue;
        }
        if field_start && c == '"' {
            state = QuoteState::Quoted;
        }
        field_start = matches!(c, ',' | '\n' | '\r');
        out.push(c);
    }

    out
}

/// `true` for rows with no fields or a single blank field.
fn is_blank(record: &StringRecord) -> bool {
    record.is_empty() || (record.len() == 1 && record[0].trim().is_empty())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
