//! Read-only facade over the window store, shaping snapshots into the wire
//! DTOs served by the dashboard.

use crate::models::dto::{ClientTotals, Drilldown, WindowSummary};
use crate::store::{QueryError, TimeWindow, WindowStore};
use std::sync::Arc;

/// Number of windows the history endpoint returns when the caller does not
/// ask for a specific count.
pub const DEFAULT_HISTORY_LEN: usize = 12;

#[derive(Clone)]
pub struct QueryService {
    store: Arc<WindowStore>,
}

impl QueryService {
    pub fn new(store: Arc<WindowStore>) -> Self {
        Self { store }
    }

    pub fn get_latest(&self) -> WindowSummary {
        summarize(&self.store.latest())
    }

    pub fn get_history(&self, n: usize) -> Vec<WindowSummary> {
        self.store.history(n).iter().map(summarize).collect()
    }

    pub fn get_drilldown(&self, start: i64, client: &str) -> Result<Drilldown, QueryError> {
        let protocols = self.store.drilldown(start, client)?;
        Ok(Drilldown {
            start,
            client: client.to_string(),
            protocols: protocols
                .into_iter()
                .map(|(label, bytes)| (label.as_str().to_string(), bytes))
                .collect(),
        })
    }
}

/// Latest/history responses carry byte totals only; the protocol breakdown
/// stays behind the drilldown endpoint.
fn summarize(window: &TimeWindow) -> WindowSummary {
    WindowSummary {
        start: window.start,
        clients: window
            .clients
            .iter()
            .map(|(ip, counters)| {
                (
                    ip.to_string(),
                    ClientTotals {
                        bytes_in: counters.bytes_in,
                        bytes_out: counters.bytes_out,
                    },
                )
            })
            .collect(),
    }
}
