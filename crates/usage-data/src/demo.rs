//! Fixed sample summary served while the store is empty.
//!
//! The counts are static; only the timestamps follow the clock.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use usage_core::models::{
    AvailableFilters, CompanyAnalytics, DashboardSummary, DateRange, TimeSeriesPoint, UsageEvent,
};
use usage_core::timestamps::format_rfc3339;

use crate::aggregator::default_time_range;

/// Build the demo snapshot relative to `now`.
pub fn demo_summary(now: DateTime<Utc>) -> DashboardSummary {
    let event_types: BTreeMap<String, usize> = [("Action", 89), ("CumulativeMetric", 45), ("Metric", 23)]
        .into_iter()
        .map(|(t, n)| (t.to_string(), n))
        .collect();

    let created = now - Duration::hours(2);
    let recent = UsageEvent {
        id: "mock-1".to_string(),
        created_at: created,
        company_id: "company-1".to_string(),
        event_type: "Action".to_string(),
        content: "User login - Sample Company".to_string(),
        attribute: "UserLogin".to_string(),
        updated_at: created,
        original_timestamp: created,
        value: String::new(),
    };

    let top_company = CompanyAnalytics {
        company_id: "company-1".to_string(),
        event_count: 45,
        last_activity: format_rfc3339(now),
        event_types: BTreeMap::from([("Action".to_string(), 25)]),
    };

    DashboardSummary {
        total_events: 157,
        unique_companies: 3,
        event_types,
        recent_events: vec![recent],
        time_range: default_time_range(now),
        time_series_data: vec![
            TimeSeriesPoint::new("2025-05-20", 23),
            TimeSeriesPoint::new("2025-05-21", 31),
        ],
        top_companies: vec![top_company],
        daily_trends: BTreeMap::from([(
            "Action".to_string(),
            vec![TimeSeriesPoint::new("2025-05-20", 15)],
        )]),
        available_filters: AvailableFilters {
            companies: vec!["company-1".to_string(), "company-2".to_string()],
            event_types: vec!["Action".to_string(), "Metric".to_string()],
            date_range: DateRange {
                min: "2025-05-01".to_string(),
                max: "2025-05-31".to_string(),
            },
        },
    }
}
