//! Predicate evaluation and pagination over the event store.

use std::ops::Range;

use usage_core::models::{FilterParams, FilteredResults, UsageEvent};

/// Apply `params` to `events` and return the requested page.
///
/// `total_count` is always `events.len()`; `filtered_count` is the number of
/// matches before pagination.
pub fn apply_filters(events: &[UsageEvent], params: &FilterParams) -> FilteredResults {
    let matcher = Matcher::new(params);
    let filtered: Vec<&UsageEvent> = events.iter().filter(|e| matcher.matches(e)).collect();

    let page = page_bounds(filtered.len(), params.offset, params.limit);

    FilteredResults {
        events: filtered[page].iter().map(|e| (*e).clone()).collect(),
        total_count: events.len(),
        filtered_count: filtered.len(),
    }
}

/// Half-open index range of the page within `filtered_count` matches.
///
/// `limit == 0` returns everything from `offset` onwards.
pub fn page_bounds(filtered_count: usize, offset: usize, limit: usize) -> Range<usize> {
    let start = offset.min(filtered_count);
    let end = if limit == 0 {
        filtered_count
    } else {
        start.saturating_add(limit).min(filtered_count)
    };
    start..end
}

// ── Matcher ───────────────────────────────────────────────────────────────────

/// Filter parameters with the search needle lower-cased once up front.
struct Matcher<'a> {
    params: &'a FilterParams,
    needle: Option<String>,
}

impl<'a> Matcher<'a> {
    fn new(params: &'a FilterParams) -> Self {
        let needle = if params.search_text.is_empty() {
            None
        } else {
            Some(params.search_text.to_lowercase())
        };
        Self { params, needle }
    }

    fn matches(&self, event: &UsageEvent) -> bool {
        let p = self.params;

        if p.start_date.is_some_and(|start| event.created_at < start) {
            return false;
        }
        if p.end_date.is_some_and(|end| event.created_at > end) {
            return false;
        }

        if !p.company_ids.is_empty() && !p.company_ids.iter().any(|c| *c == event.company_id) {
            return false;
        }

        if !p.event_types.is_empty() && !p.event_types.iter().any(|t| *t == event.event_type) {
            return false;
        }

        if let Some(needle) = &self.needle {
            let haystack = format!(
                "{} {} {} {}",
                event.content, event.attribute, event.value, event.company_id
            )
            .to_lowercase();
            if !haystack.contains(needle.as_str()) {
                return false;
            }
        }

        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
