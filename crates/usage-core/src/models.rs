use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// A single usage record read from one of the source CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Event identifier as found in the source file.
    #[serde(default)]
    pub id: String,
    /// When the event was recorded (UTC).
    pub created_at: DateTime<Utc>,
    /// Owning company identifier.
    #[serde(default)]
    pub company_id: String,
    /// Event category, e.g. `"Action"` or `"Metric"`.
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Free-text description.
    #[serde(default)]
    pub content: String,
    /// Attribute name the value belongs to.
    #[serde(default)]
    pub attribute: String,
    /// Last update time; equals `created_at` when the source had none.
    pub updated_at: DateTime<Utc>,
    /// Upstream timestamp; equals `created_at` when the source had none.
    pub original_timestamp: DateTime<Utc>,
    /// Raw value, possibly a number or a currency amount.
    #[serde(default)]
    pub value: String,
}

/// Normalised search / export predicate plus pagination.
///
/// Every dimension left empty matches all events. `limit == 0` disables
/// pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Inclusive lower bound on `created_at`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end_date: Option<DateTime<Utc>>,
    /// Company ids, OR-matched.
    pub company_ids: Vec<String>,
    /// Event types, OR-matched.
    pub event_types: Vec<String>,
    /// Case-insensitive substring search; empty means no search.
    pub search_text: String,
    pub limit: usize,
    pub offset: usize,
}

/// One page of a filtered search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredResults {
    pub events: Vec<UsageEvent>,
    /// Size of the whole store.
    pub total_count: usize,
    /// Number of matches before pagination.
    pub filtered_count: usize,
}

/// Earliest and latest `created_at` across the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Event count for one calendar day (`%Y-%m-%d`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub count: usize,
}

impl TimeSeriesPoint {
    pub fn new(date: impl Into<String>, count: usize) -> Self {
        Self {
            date: date.into(),
            count,
        }
    }
}

/// Per-company activity used for the "top companies" ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAnalytics {
    pub company_id: String,
    pub event_count: usize,
    /// RFC 3339 timestamp of the most recent event.
    pub last_activity: String,
    pub event_types: BTreeMap<String, usize>,
}

/// Inclusive date bounds (`%Y-%m-%d`), empty when the store is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: String,
    pub max: String,
}

/// Values a client can offer in its filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableFilters {
    pub companies: Vec<String>,
    pub event_types: Vec<String>,
    pub date_range: DateRange,
}

/// Snapshot of dashboard statistics derived from the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_events: usize,
    pub unique_companies: usize,
    pub event_types: BTreeMap<String, usize>,
    pub recent_events: Vec<UsageEvent>,
    pub time_range: TimeRange,
    pub time_series_data: Vec<TimeSeriesPoint>,
    pub top_companies: Vec<CompanyAnalytics>,
    pub daily_trends: BTreeMap<String, Vec<TimeSeriesPoint>>,
    pub available_filters: AvailableFilters,
}

/// Output representation for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// MIME type sent alongside the exported bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }

    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(DashboardError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
