//! Public event feed with multi-select filters.
//!
//! The list endpoint accepts at most one sport type and one event type per
//! query, but the browsing UI lets a user select several of each. The feed
//! turns a multi-selection into one query per combination, merges the
//! responses with by-id de-duplication, and drops anything not marked
//! public from the merged listing.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, EventFilter};
use crate::models::Event;

/// Maximum concurrent feed queries.
/// A multi-selection fans out to a handful of requests; 4 keeps them
/// overlapping without hammering the server.
const MAX_CONCURRENT_QUERIES: usize = 4;

/// Whether a feed load is currently running. Success and failure travel
/// through `refresh`'s return value; this signal only says "busy or not",
/// so an observer never has to guess whether an empty list means "no
/// events" or "still loading".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
}

/// Filter state for the public event listing.
#[derive(Debug, Clone, Default)]
pub struct FeedFilters {
    pub sport_types: BTreeSet<i64>,
    pub event_types: BTreeSet<i64>,
    pub search: Option<String>,
    pub city: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FeedFilters {
    fn base_filter(&self) -> EventFilter {
        EventFilter {
            search: self.search.clone(),
            city: self.city.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
            include_private: Some(false),
            ..EventFilter::default()
        }
    }

    /// One `GET events/` query per selected sport-type/event-type
    /// combination. An empty axis contributes a single unconstrained slot,
    /// so no selection at all degrades to one plain query.
    fn queries(&self) -> Vec<EventFilter> {
        let sports: Vec<Option<i64>> = if self.sport_types.is_empty() {
            vec![None]
        } else {
            self.sport_types.iter().copied().map(Some).collect()
        };
        let kinds: Vec<Option<i64>> = if self.event_types.is_empty() {
            vec![None]
        } else {
            self.event_types.iter().copied().map(Some).collect()
        };

        let mut queries = Vec::with_capacity(sports.len() * kinds.len());
        for &sport in &sports {
            for &kind in &kinds {
                let mut filter = self.base_filter();
                filter.sport_type = sport;
                filter.event_type = kind;
                queries.push(filter);
            }
        }
        queries
    }
}

/// Aggregated public event listing over an `ApiClient`.
pub struct EventFeed {
    client: ApiClient,
    pub filters: FeedFilters,
    status_tx: watch::Sender<FeedStatus>,
}

impl EventFeed {
    pub fn new(client: ApiClient) -> Self {
        let (status_tx, _) = watch::channel(FeedStatus::Idle);
        Self {
            client,
            filters: FeedFilters::default(),
            status_tx,
        }
    }

    /// Subscribe to the in-flight signal.
    pub fn status(&self) -> watch::Receiver<FeedStatus> {
        self.status_tx.subscribe()
    }

    pub fn add_sport_type(&mut self, id: i64) {
        self.filters.sport_types.insert(id);
    }

    pub fn remove_sport_type(&mut self, id: i64) {
        self.filters.sport_types.remove(&id);
    }

    pub fn add_event_type(&mut self, id: i64) {
        self.filters.event_types.insert(id);
    }

    pub fn remove_event_type(&mut self, id: i64) {
        self.filters.event_types.remove(&id);
    }

    pub fn set_search(&mut self, query: Option<String>) {
        self.filters.search = query;
    }

    pub fn set_city(&mut self, city: Option<String>) {
        self.filters.city = city;
    }

    pub fn set_date_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.filters.date_from = from;
        self.filters.date_to = to;
    }

    pub fn clear_filters(&mut self) {
        self.filters = FeedFilters::default();
    }

    /// Load the public listing for the current filters.
    pub async fn refresh(&self) -> Result<Vec<Event>, ApiError> {
        self.status_tx.send_replace(FeedStatus::Loading);
        let result = self.load().await;
        self.status_tx.send_replace(FeedStatus::Idle);
        result
    }

    async fn load(&self) -> Result<Vec<Event>, ApiError> {
        let queries = self.filters.queries();
        debug!(queries = queries.len(), "Loading public event feed");

        let client = &self.client;
        let outcomes: Vec<Result<Vec<Event>, ApiError>> = stream::iter(queries)
            .map(|filter| async move { client.events(&filter).await })
            .buffered(MAX_CONCURRENT_QUERIES)
            .collect()
            .await;

        merge_public(outcomes)
    }
}

/// Merge per-query results into one public listing: de-duplicate by event
/// id (first occurrence wins, order preserved) and drop non-public events.
/// A query failure only surfaces as an error when every query failed and
/// nothing was gathered; a partial feed beats no feed.
fn merge_public(outcomes: Vec<Result<Vec<Event>, ApiError>>) -> Result<Vec<Event>, ApiError> {
    let mut merged = Vec::new();
    let mut seen = HashSet::new();
    let mut last_error = None;

    for outcome in outcomes {
        match outcome {
            Ok(events) => {
                for event in events {
                    if event.is_public && seen.insert(event.id) {
                        merged.push(event);
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "Event feed query failed");
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(err) if merged.is_empty() => Err(err),
        _ => Ok(merged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::tests::sample_event_json;

    fn event(id: i64, is_public: bool) -> Event {
        serde_json::from_value(sample_event_json(id, is_public)).expect("sample event")
    }

    #[test]
    fn test_no_selection_is_one_query() {
        let filters = FeedFilters::default();
        let queries = filters.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].sport_type, None);
        assert_eq!(queries[0].event_type, None);
        assert_eq!(queries[0].include_private, Some(false));
    }

    #[test]
    fn test_two_by_two_selection_fans_out_to_four_queries() {
        let mut filters = FeedFilters::default();
        filters.sport_types.extend([1, 2]);
        filters.event_types.extend([10, 20]);

        let queries = filters.queries();
        assert_eq!(queries.len(), 4);
        let combos: Vec<(Option<i64>, Option<i64>)> = queries
            .iter()
            .map(|q| (q.sport_type, q.event_type))
            .collect();
        for combo in [
            (Some(1), Some(10)),
            (Some(1), Some(20)),
            (Some(2), Some(10)),
            (Some(2), Some(20)),
        ] {
            assert!(combos.contains(&combo), "missing combination {combo:?}");
        }
    }

    #[test]
    fn test_single_axis_selection_pins_the_other() {
        let mut filters = FeedFilters::default();
        filters.sport_types.extend([5, 6, 7]);
        filters.event_types.insert(9);

        let queries = filters.queries();
        assert_eq!(queries.len(), 3);
        assert!(queries.iter().all(|q| q.event_type == Some(9)));
    }

    #[test]
    fn test_merge_deduplicates_by_id() {
        let outcomes = vec![
            Ok(vec![event(1, true), event(2, true)]),
            Ok(vec![event(2, true), event(3, true)]),
        ];
        let merged = merge_public(outcomes).expect("merge");
        let ids: Vec<i64> = merged.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_drops_private_events() {
        let outcomes = vec![Ok(vec![event(1, true), event(2, false), event(3, true)])];
        let merged = merge_public(outcomes).expect("merge");
        let ids: Vec<i64> = merged.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_partial_failure_keeps_gathered_events() {
        let outcomes = vec![
            Err(ApiError::Connectivity("connection timed out".to_string())),
            Ok(vec![event(4, true)]),
        ];
        let merged = merge_public(outcomes).expect("merge");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 4);
    }

    #[test]
    fn test_total_failure_surfaces_the_error() {
        let outcomes: Vec<Result<Vec<Event>, ApiError>> = vec![
            Err(ApiError::Connectivity("unable to connect to server".to_string())),
            Err(ApiError::Unauthorized),
        ];
        let err = merge_public(outcomes).expect_err("should fail");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_all_empty_success_is_an_empty_feed() {
        let outcomes: Vec<Result<Vec<Event>, ApiError>> = vec![Ok(vec![]), Ok(vec![])];
        let merged = merge_public(outcomes).expect("merge");
        assert!(merged.is_empty());
    }
}
