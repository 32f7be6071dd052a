//! Request shapes handed over by the serving layer and their normalisation
//! into [`FilterParams`].

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::models::FilterParams;
use crate::timestamps::{end_of_day, parse_date, start_of_day};

/// Page size applied when the caller gives no limit, or a non-positive one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

// ── FilterQuery ───────────────────────────────────────────────────────────────

/// Raw filter parameters as received from a client.
///
/// Dates are `YYYY-MM-DD` strings; list entries are whitespace-trimmed and
/// blanks dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub company_ids: Vec<String>,
    pub event_types: Vec<String>,
    #[serde(alias = "search", skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

impl FilterQuery {
    /// Validate and normalise into [`FilterParams`].
    ///
    /// * `end_date` is widened to 23:59:59 of that day.
    /// * `limit` defaults to [`DEFAULT_PAGE_LIMIT`] when absent or `<= 0`.
    /// * `offset` defaults to 0; a negative offset is rejected.
    pub fn into_params(self) -> Result<FilterParams> {
        self.normalize(DEFAULT_PAGE_LIMIT)
    }

    /// Same as [`FilterQuery::into_params`], but an absent or `<= 0` limit
    /// means no limit, so an export covers every match by default.
    pub fn into_export_params(self) -> Result<FilterParams> {
        self.normalize(0)
    }

    fn normalize(self, default_limit: usize) -> Result<FilterParams> {
        let start_date = self
            .start_date
            .as_deref()
            .map(|s| parse_bound("start_date", s))
            .transpose()?
            .map(start_of_day);
        let end_date = self
            .end_date
            .as_deref()
            .map(|s| parse_bound("end_date", s))
            .transpose()?
            .map(end_of_day);

        let limit = match self.limit {
            Some(l) if l > 0 => l as usize,
            _ => default_limit,
        };

        let offset = match self.offset {
            None => 0,
            Some(o) if o < 0 => {
                return Err(DashboardError::InvalidFilter(format!(
                    "offset must not be negative, got {o}"
                )));
            }
            Some(o) => o as usize,
        };

        Ok(FilterParams {
            start_date,
            end_date,
            company_ids: clean_list(self.company_ids),
            event_types: clean_list(self.event_types),
            search_text: self
                .search_text
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            limit,
            offset,
        })
    }
}

// ── ExportRequest ─────────────────────────────────────────────────────────────

/// Body of an export request: a format name plus the filter to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: String,
    #[serde(default)]
    pub filters: FilterQuery,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Split a comma-separated query value into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| split_list(v))
        .collect()
}

fn parse_bound(name: &str, value: &str) -> Result<chrono::NaiveDate> {
    parse_date(value).ok_or_else(|| {
        DashboardError::InvalidFilter(format!("{name} must be YYYY-MM-DD, got \"{value}\""))
    })
}
