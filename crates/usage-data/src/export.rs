//! CSV / JSON serialization of a filtered event page.

use chrono::{DateTime, Utc};
use tracing::info;
use usage_core::error::{DashboardError, Result};
use usage_core::models::{ExportFormat, FilterParams, UsageEvent};
use usage_core::timestamps::format_rfc3339;

use crate::filter::apply_filters;

/// Leading component of every export filename.
pub const EXPORT_FILENAME_PREFIX: &str = "usage_analytics";

const CSV_HEADER: [&str; 9] = [
    "ID",
    "Created At",
    "Company ID",
    "Type",
    "Content",
    "Attribute",
    "Updated At",
    "Original Timestamp",
    "Value",
];

/// Serialized export body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Filter `events` with `params` and serialize the resulting page.
///
/// The format is validated before anything else, so an unsupported format is
/// reported even when the store is empty.
pub fn export_events(
    events: &[UsageEvent],
    params: &FilterParams,
    format: &str,
) -> Result<ExportPayload> {
    let format: ExportFormat = format.parse()?;

    if events.is_empty() {
        return Err(DashboardError::EmptyStore);
    }

    let page = apply_filters(events, params);

    let bytes = match format {
        ExportFormat::Csv => write_csv(&page.events)?,
        ExportFormat::Json => serde_json::to_vec_pretty(&page.events)?,
    };

    info!(
        "Exported {} of {} matching events as {} ({} bytes)",
        page.events.len(),
        page.filtered_count,
        format,
        bytes.len()
    );

    Ok(ExportPayload {
        bytes,
        content_type: format.content_type(),
    })
}

/// `usage_analytics_{YYYYmmdd_HHMMSS}[_search][_filtered].{ext}`
pub fn export_filename(format: ExportFormat, params: &FilterParams, now: DateTime<Utc>) -> String {
    let mut suffix = String::new();
    if !params.search_text.is_empty() {
        suffix.push_str("_search");
    }
    if !params.company_ids.is_empty() {
        suffix.push_str("_filtered");
    }

    format!(
        "{}_{}{}.{}",
        EXPORT_FILENAME_PREFIX,
        now.format("%Y%m%d_%H%M%S"),
        suffix,
        format.extension()
    )
}

fn write_csv(events: &[UsageEvent]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for event in events {
        writer.write_record([
            event.id.as_str(),
            &format_rfc3339(event.created_at),
            &event.company_id,
            &event.event_type,
            &event.content,
            &event.attribute,
            &format_rfc3339(event.updated_at),
            &format_rfc3339(event.original_timestamp),
            &event.value,
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| DashboardError::Io(e.into_error()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
