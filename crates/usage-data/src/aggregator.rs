//! Dashboard statistics over the whole event store.
//!
//! Every metric is a pure function of the event slice; only the empty-store
//! fallbacks consult the clock.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Months, Utc};
use usage_core::models::{
    AvailableFilters, CompanyAnalytics, DashboardSummary, DateRange, TimeRange, TimeSeriesPoint,
    UsageEvent,
};
use usage_core::timestamps::{date_key, format_rfc3339};

use crate::demo::demo_summary;

/// Number of events listed under "recent events".
pub const RECENT_EVENTS_LIMIT: usize = 10;

/// Number of companies in the "top companies" ranking.
pub const TOP_COMPANIES_LIMIT: usize = 5;

/// Trend bucket for events without a type.
pub const UNKNOWN_TYPE: &str = "Unknown";

// ── UsageAggregator ───────────────────────────────────────────────────────────

/// Stateless helper computing the dashboard metrics.
pub struct UsageAggregator;

impl UsageAggregator {
    /// Build the full summary, or the demo snapshot when `events` is empty.
    pub fn summarize(events: &[UsageEvent]) -> DashboardSummary {
        Self::summarize_at(events, Utc::now())
    }

    /// Same as [`UsageAggregator::summarize`] with an explicit clock.
    pub fn summarize_at(events: &[UsageEvent], now: DateTime<Utc>) -> DashboardSummary {
        if events.is_empty() {
            return demo_summary(now);
        }

        DashboardSummary {
            total_events: events.len(),
            unique_companies: Self::unique_company_count(events),
            event_types: Self::event_type_breakdown(events),
            recent_events: Self::recent_events(events, RECENT_EVENTS_LIMIT),
            time_range: Self::time_range(events, now),
            time_series_data: Self::daily_counts(events),
            top_companies: Self::top_companies(events, TOP_COMPANIES_LIMIT),
            daily_trends: Self::daily_trends(events),
            available_filters: Self::available_filters(events),
        }
    }

    /// Distinct non-empty company ids.
    pub fn unique_company_count(events: &[UsageEvent]) -> usize {
        events
            .iter()
            .filter(|e| !e.company_id.is_empty())
            .map(|e| e.company_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Count per non-empty event type.
    pub fn event_type_breakdown(events: &[UsageEvent]) -> BTreeMap<String, usize> {
        let mut breakdown: BTreeMap<String, usize> = BTreeMap::new();
        for event in events.iter().filter(|e| !e.event_type.is_empty()) {
            *breakdown.entry(event.event_type.clone()).or_default() += 1;
        }
        breakdown
    }

    /// Newest `limit` events; equal timestamps keep store order.
    pub fn recent_events(events: &[UsageEvent], limit: usize) -> Vec<UsageEvent> {
        let mut sorted: Vec<&UsageEvent> = events.iter().collect();
        // sort_by is stable.
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.into_iter().take(limit).cloned().collect()
    }

    /// Earliest and latest `created_at`; `[now - 1 month, now]` when empty.
    pub fn time_range(events: &[UsageEvent], now: DateTime<Utc>) -> TimeRange {
        let start = events.iter().map(|e| e.created_at).min();
        let end = events.iter().map(|e| e.created_at).max();
        match (start, end) {
            (Some(start), Some(end)) => TimeRange { start, end },
            _ => default_time_range(now),
        }
    }

    /// Events per UTC day, ascending by date.
    pub fn daily_counts(events: &[UsageEvent]) -> Vec<TimeSeriesPoint> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for event in events {
            *counts.entry(date_key(event.created_at)).or_default() += 1;
        }
        to_series(counts)
    }

    /// Busiest companies by event count.
    ///
    /// Ties are broken by `company_id` ascending so the ranking is stable
    /// across runs.
    pub fn top_companies(events: &[UsageEvent], limit: usize) -> Vec<CompanyAnalytics> {
        let mut stats: HashMap<&str, CompanyAnalytics> = HashMap::new();

        for event in events.iter().filter(|e| !e.company_id.is_empty()) {
            let entry = stats
                .entry(event.company_id.as_str())
                .or_insert_with(|| CompanyAnalytics {
                    company_id: event.company_id.clone(),
                    event_count: 0,
                    last_activity: String::new(),
                    event_types: BTreeMap::new(),
                });

            entry.event_count += 1;

            if !event.event_type.is_empty() {
                *entry.event_types.entry(event.event_type.clone()).or_default() += 1;
            }

            // Fixed-width RFC 3339 strings compare chronologically.
            let activity = format_rfc3339(event.created_at);
            if activity > entry.last_activity {
                entry.last_activity = activity;
            }
        }

        let mut companies: Vec<CompanyAnalytics> = stats.into_values().collect();
        companies.sort_by(|a, b| {
            b.event_count
                .cmp(&a.event_count)
                .then_with(|| a.company_id.cmp(&b.company_id))
        });
        companies.truncate(limit);
        companies
    }

    /// Per-type daily series; untyped events go under [`UNKNOWN_TYPE`].
    pub fn daily_trends(events: &[UsageEvent]) -> BTreeMap<String, Vec<TimeSeriesPoint>> {
        let mut by_type: BTreeMap<&str, BTreeMap<String, usize>> = BTreeMap::new();

        for event in events {
            let event_type = if event.event_type.is_empty() {
                UNKNOWN_TYPE
            } else {
                event.event_type.as_str()
            };
            *by_type
                .entry(event_type)
                .or_default()
                .entry(date_key(event.created_at))
                .or_default() += 1;
        }

        by_type
            .into_iter()
            .map(|(event_type, counts)| (event_type.to_string(), to_series(counts)))
            .collect()
    }

    /// Distinct companies and types (sorted) plus the covered date span.
    pub fn available_filters(events: &[UsageEvent]) -> AvailableFilters {
        let companies: BTreeSet<&str> = events
            .iter()
            .filter(|e| !e.company_id.is_empty())
            .map(|e| e.company_id.as_str())
            .collect();
        let event_types: BTreeSet<&str> = events
            .iter()
            .filter(|e| !e.event_type.is_empty())
            .map(|e| e.event_type.as_str())
            .collect();

        let date_range = match (
            events.iter().map(|e| e.created_at).min(),
            events.iter().map(|e| e.created_at).max(),
        ) {
            (Some(min), Some(max)) => DateRange {
                min: date_key(min),
                max: date_key(max),
            },
            _ => DateRange::default(),
        };

        AvailableFilters {
            companies: companies.into_iter().map(str::to_string).collect(),
            event_types: event_types.into_iter().map(str::to_string).collect(),
            date_range,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The month leading up to `now`.
pub fn default_time_range(now: DateTime<Utc>) -> TimeRange {
    let start = now.checked_sub_months(Months::new(1)).unwrap_or(now);
    TimeRange { start, end: now }
}

fn to_series(counts: BTreeMap<String, usize>) -> Vec<TimeSeriesPoint> {
    counts
        .into_iter()
        .map(|(date, count)| TimeSeriesPoint { date, count })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
