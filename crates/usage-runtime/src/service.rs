//! Read-only analytics service over a loaded event snapshot.
//!
//! [`AnalyticsService`] is built once at startup and then cloned into every
//! handler; all queries borrow the shared store without locking.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use usage_core::error::{DashboardError, Result};
use usage_core::models::{DashboardSummary, ExportFormat, FilterParams, FilteredResults};
use usage_core::query::ExportRequest;
use usage_data::aggregator::UsageAggregator;
use usage_data::export::{export_events, export_filename};
use usage_data::filter::apply_filters;
use usage_data::store::EventStore;

/// Name reported by [`AnalyticsService::health`].
pub const SERVICE_NAME: &str = "usage-analytics-api";

/// Capabilities reported by [`AnalyticsService::health`].
pub const FEATURES: [&str; 3] = ["filtering", "search", "export"];

// ── Response types ────────────────────────────────────────────────────────────

/// A finished export, ready to be written or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Static service description for liveness probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub service: String,
    pub version: String,
    pub features: Vec<String>,
}

// ── AnalyticsService ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AnalyticsService {
    store: Arc<EventStore>,
}

impl AnalyticsService {
    /// Load the source files under `data_path`.
    ///
    /// A directory without any usable rows is not fatal: the service starts
    /// with an empty store and the summary falls back to demo data.
    pub fn load(data_path: &Path) -> Result<Self> {
        let store = match EventStore::load(data_path) {
            Ok(store) => store,
            Err(DashboardError::NoData(path)) => {
                tracing::warn!(
                    "No usage data found in {}; dashboard will use demo data",
                    path.display()
                );
                EventStore::empty()
            }
            Err(e) => return Err(e),
        };
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: EventStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn dashboard_summary(&self) -> DashboardSummary {
        UsageAggregator::summarize(self.store.events())
    }

    pub fn search_events(&self, params: &FilterParams) -> FilteredResults {
        let results = apply_filters(self.store.events(), params);
        tracing::debug!(
            "Search matched {} of {} events, returning {}",
            results.filtered_count,
            results.total_count,
            results.events.len()
        );
        results
    }

    /// Normalise the request filters, serialize the matching page and name
    /// the resulting file.
    pub fn export_data(&self, request: &ExportRequest) -> Result<ExportFile> {
        let format: ExportFormat = request.format.parse()?;
        let params = request.filters.clone().into_export_params()?;

        let payload = export_events(self.store.events(), &params, &request.format)?;
        let filename = export_filename(format, &params, Utc::now());

        Ok(ExportFile {
            bytes: payload.bytes,
            content_type: payload.content_type,
            filename,
        })
    }

    pub fn health(&self) -> HealthInfo {
        HealthInfo {
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::TempDir;
    use usage_core::models::UsageEvent;
    use usage_core::query::FilterQuery;
    use usage_data::reader::SOURCE_FILES;

    fn make_event(id: &str, company: &str, event_type: &str) -> UsageEvent {
        let ts = Utc.with_ymd_and_hms(2025, 5, 20, 10, 0, 0).unwrap();
        UsageEvent {
            id: id.to_string(),
            created_at: ts,
            company_id: company.to_string(),
            event_type: event_type.to_string(),
            content: format!("{event_type} by {company}"),
            attribute: String::new(),
            updated_at: ts,
            original_timestamp: ts,
            value: String::new(),
        }
    }

    fn service() -> AnalyticsService {
        AnalyticsService::from_store(EventStore::from_events(vec![
            make_event("1", "A", "Action"),
            make_event("2", "A", "Metric"),
            make_event("3", "B", "Action"),
        ]))
    }

    #[test]
    fn test_load_missing_data_falls_back_to_demo() {
        let dir = TempDir::new().unwrap();
        let svc = AnalyticsService::load(dir.path()).unwrap();
        assert!(svc.store().is_empty());
        assert_eq!(svc.dashboard_summary().total_events, 157);
    }

    #[test]
    fn test_load_reads_both_files() {
        let dir = TempDir::new().unwrap();
        for (i, name) in SOURCE_FILES.iter().enumerate() {
            let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
            writeln!(file, "id,created_at,company_id,type").unwrap();
            writeln!(file, "e{i},2025-05-2{i} 10:00:00,acme,Action").unwrap();
        }

        let svc = AnalyticsService::load(dir.path()).unwrap();
        let summary = svc.dashboard_summary();
        assert_eq!(summary.total_events, 2);
        assert_eq!(summary.time_series_data.len(), 2);
    }

    #[test]
    fn test_search_events() {
        let params = FilterParams {
            company_ids: vec!["A".to_string()],
            ..Default::default()
        };
        let results = service().search_events(&params);
        assert_eq!(results.filtered_count, 2);
        assert_eq!(results.total_count, 3);
    }

    #[test]
    fn test_search_empty_store() {
        let svc = AnalyticsService::default();
        assert_eq!(
            svc.search_events(&FilterParams::default()),
            FilteredResults::default()
        );
    }

    #[test]
    fn test_export_data_csv() {
        let request = ExportRequest {
            format: "csv".to_string(),
            filters: FilterQuery {
                company_ids: vec!["B".to_string()],
                ..Default::default()
            },
        };
        let file = service().export_data(&request).unwrap();

        assert_eq!(file.content_type, "text/csv");
        assert!(file.filename.starts_with("usage_analytics_"));
        assert!(file.filename.ends_with("_filtered.csv"));
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_export_data_json_covers_whole_store() {
        let events: Vec<UsageEvent> = (0..120)
            .map(|i| make_event(&i.to_string(), "A", "Action"))
            .collect();
        let svc = AnalyticsService::from_store(EventStore::from_events(events));

        for limit in [None, Some(0)] {
            let request = ExportRequest {
                format: "json".to_string(),
                filters: FilterQuery {
                    limit,
                    ..Default::default()
                },
            };
            let file = svc.export_data(&request).unwrap();
            let back: Vec<UsageEvent> = serde_json::from_slice(&file.bytes).unwrap();
            assert_eq!(back.len(), 120);
            assert_eq!(back, svc.store().events());
        }
    }

    #[test]
    fn test_export_data_explicit_limit() {
        let request = ExportRequest {
            format: "json".to_string(),
            filters: FilterQuery {
                limit: Some(2),
                ..Default::default()
            },
        };
        let file = service().export_data(&request).unwrap();
        let back: Vec<UsageEvent> = serde_json::from_slice(&file.bytes).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn test_export_data_errors() {
        let bad_format = ExportRequest {
            format: "xml".to_string(),
            filters: FilterQuery::default(),
        };
        assert!(matches!(
            service().export_data(&bad_format),
            Err(DashboardError::UnsupportedFormat(_))
        ));

        let bad_offset = ExportRequest {
            format: "json".to_string(),
            filters: FilterQuery {
                offset: Some(-1),
                ..Default::default()
            },
        };
        assert!(matches!(
            service().export_data(&bad_offset),
            Err(DashboardError::InvalidFilter(_))
        ));

        let empty = ExportRequest {
            format: "json".to_string(),
            filters: FilterQuery::default(),
        };
        assert!(matches!(
            AnalyticsService::default().export_data(&empty),
            Err(DashboardError::EmptyStore)
        ));
    }

    #[test]
    fn test_health() {
        let health = service().health();
        assert_eq!(health.service, "usage-analytics-api");
        assert_eq!(health.features, vec!["filtering", "search", "export"]);
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_queries_share_store() {
        let svc = service();
        let mut handles = Vec::new();

        for i in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    svc.dashboard_summary().total_events
                } else {
                    svc.search_events(&FilterParams::default()).filtered_count
                }
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 3);
        }
    }
}
