//! Dashboard stats: four aggregate counts, stale on error

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::store::{Collection, GatewayError, Predicate, RemoteGateway};

const LOST_ACTIVE: [Predicate; 2] = [
    Predicate::eq("type", "lost"),
    Predicate::eq("status", "active"),
];
const FOUND_ACTIVE: [Predicate; 2] = [
    Predicate::eq("type", "found"),
    Predicate::eq("status", "active"),
];
const THRIFT_AVAILABLE: [Predicate; 1] = [Predicate::eq("status", "available")];
const LOST_REUNITED: [Predicate; 2] = [
    Predicate::eq("type", "lost"),
    Predicate::eq("status", "found"),
];

/// Counts shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    /// Lost items still active
    pub lost: u64,
    /// Found items waiting to be claimed
    pub found: u64,
    /// Thrift items available now
    pub thrift: u64,
    /// Lost items marked found, all time
    pub reunited: u64,
    pub loading: bool,
}

impl Default for StatsSummary {
    fn default() -> Self {
        Self {
            lost: 0,
            found: 0,
            thrift: 0,
            reunited: 0,
            loading: true,
        }
    }
}

/// Summary plus whether the last refresh failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsView {
    #[serde(flatten)]
    pub summary: StatsSummary,
    pub stale: bool,
}

struct StatsState {
    summary: StatsSummary,
    stale: bool,
    applied: u64,
}

/// Issues the dashboard count queries and keeps the latest summary
pub struct StatsAggregator {
    gateway: Arc<dyn RemoteGateway>,
    state: Mutex<StatsState>,
    issued: AtomicU64,
}

impl StatsAggregator {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(StatsState {
                summary: StatsSummary::default(),
                stale: false,
                applied: 0,
            }),
            issued: AtomicU64::new(0),
        }
    }

    pub fn view(&self) -> StatsView {
        let state = self.state.lock();
        StatsView {
            summary: state.summary,
            stale: state.stale,
        }
    }

    /// Re-run all four counts; any failure keeps every previous count
    pub async fn refresh(&self) -> StatsView {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().summary.loading = true;

        let result = self.fetch_counts().await;

        let mut state = self.state.lock();
        if ticket < state.applied {
            debug!(ticket, applied = state.applied, "Dropping stale stats refresh");
        } else {
            state.applied = ticket;
            match result {
                Ok(summary) => {
                    info!(
                        lost = summary.lost,
                        found = summary.found,
                        thrift = summary.thrift,
                        reunited = summary.reunited,
                        "Stats refreshed"
                    );
                    state.summary = summary;
                    state.stale = false;
                }
                Err(e) => {
                    error!(error = %e, "Error fetching stats");
                    state.stale = true;
                }
            }
            state.summary.loading = self.issued.load(Ordering::SeqCst) > ticket;
        }

        StatsView {
            summary: state.summary,
            stale: state.stale,
        }
    }

    async fn fetch_counts(&self) -> Result<StatsSummary, GatewayError> {
        let gateway = &self.gateway;
        let (lost, found, thrift, reunited) = futures::try_join!(
            gateway.count(Collection::LostFound, &LOST_ACTIVE),
            gateway.count(Collection::LostFound, &FOUND_ACTIVE),
            gateway.count(Collection::Thrift, &THRIFT_AVAILABLE),
            gateway.count(Collection::LostFound, &LOST_REUNITED),
        )?;

        Ok(StatsSummary {
            lost,
            found,
            thrift,
            reunited,
            loading: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryGateway;
    use serde_json::{json, Value};

    fn lf(kind: &str, status: &str) -> Value {
        json!({"type": kind, "status": status})
    }

    fn rows(n: usize, row: Value) -> Vec<Value> {
        std::iter::repeat(row).take(n).collect()
    }

    fn seeded() -> Arc<MemoryGateway> {
        let mut lost_found = rows(3, lf("lost", "active"));
        lost_found.extend(rows(5, lf("found", "active")));
        lost_found.extend(rows(1, lf("lost", "found")));
        lost_found.extend(rows(4, lf("lost", "closed")));
        lost_found.push(lf("found", "found"));

        let gateway = MemoryGateway::with_rows(Collection::LostFound, lost_found);
        let mut thrift = rows(2, json!({"status": "available"}));
        thrift.push(json!({"status": "sold"}));
        gateway.set_rows(Collection::Thrift, thrift);
        Arc::new(gateway)
    }

    #[tokio::test]
    async fn starts_loading_with_zero_counts() {
        let stats = StatsAggregator::new(seeded());
        let view = stats.view();
        assert!(view.summary.loading);
        assert_eq!(view.summary.lost + view.summary.found, 0);
    }

    #[tokio::test]
    async fn summary_matches_counts() {
        let gateway = seeded();
        let stats = StatsAggregator::new(gateway.clone());
        let view = stats.refresh().await;

        assert_eq!(
            view.summary,
            StatsSummary {
                lost: 3,
                found: 5,
                thrift: 2,
                reunited: 1,
                loading: false,
            }
        );
        assert!(!view.stale);
        assert_eq!(gateway.count_calls(), 4);
    }

    #[tokio::test]
    async fn failure_keeps_previous_counts() {
        let gateway = seeded();
        let stats = StatsAggregator::new(gateway.clone());
        let before = stats.refresh().await.summary;

        gateway.set_failing(true);
        let view = stats.refresh().await;
        assert_eq!(view.summary, before);
        assert!(!view.summary.loading);
        assert!(view.stale);

        gateway.set_failing(false);
        assert!(!stats.refresh().await.stale);
    }

    #[tokio::test]
    async fn one_failing_query_keeps_all_previous_counts() {
        let gateway = seeded();
        let stats = StatsAggregator::new(gateway.clone());
        let before = stats.refresh().await.summary;

        // The lost & found counts would change, but the thrift count fails
        gateway.set_rows(Collection::LostFound, rows(9, lf("lost", "active")));
        gateway.fail_counts_on(Some(Collection::Thrift));
        let view = stats.refresh().await;
        assert_eq!(view.summary, before);
        assert!(view.stale);

        gateway.fail_counts_on(None);
        let view = stats.refresh().await;
        assert_eq!(view.summary.lost, 9);
        assert!(!view.stale);
    }

    #[tokio::test]
    async fn failure_before_any_success_keeps_zeroes() {
        let gateway = seeded();
        gateway.set_failing(true);
        let stats = StatsAggregator::new(gateway);
        let view = stats.refresh().await;
        assert_eq!(
            view.summary,
            StatsSummary {
                loading: false,
                ..StatsSummary::default()
            }
        );
    }

    #[test]
    fn summary_serializes_flat_with_stale_flag() {
        let view = StatsView {
            summary: StatsSummary {
                lost: 3,
                found: 5,
                thrift: 2,
                reunited: 1,
                loading: false,
            },
            stale: false,
        };
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            json!({"lost": 3, "found": 5, "thrift": 2, "reunited": 1, "loading": false, "stale": false})
        );
    }
}
