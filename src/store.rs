//! Time-bucketed per-client traffic aggregation.

use crate::models::domain::{ClassifiedPacket, Direction, ProtocolLabel};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Mutex;
use thiserror::Error;

/// Per-client accumulator inside one time window. Every accounted byte goes
/// to exactly one direction counter and exactly one protocol bucket, so
/// `bytes_in + bytes_out` always equals the histogram sum.
#[derive(Debug, Clone, Default)]
pub struct ClientCounters {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub protocols: HashMap<ProtocolLabel, u64>,
}

/// One fixed-duration traffic bucket, identified by its aligned start
/// timestamp (`start % window_size == 0`).
#[derive(Debug, Clone)]
pub struct TimeWindow {
    pub start: i64,
    pub clients: HashMap<IpAddr, ClientCounters>,
}

impl TimeWindow {
    fn new(start: i64) -> Self {
        Self {
            start,
            clients: HashMap::new(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Window {0} not found")]
    WindowNotFound(i64),
    #[error("Client {client} not found in window {start}")]
    ClientNotFound { start: i64, client: String },
}

/// Bounded, mutex-guarded sequence of recent time windows.
///
/// Windows are appended in arrival order with non-decreasing start
/// timestamps; only the newest window is ever written to. Queries return
/// clones, never references into the locked state, so readers cannot
/// observe concurrent mutation.
pub struct WindowStore {
    window_size: i64,
    capacity: usize,
    windows: Mutex<VecDeque<TimeWindow>>,
}

impl WindowStore {
    /// `window_size` and `capacity` must both be at least 1; the config
    /// layer rejects anything else before a store is built.
    pub fn new(window_size: i64, capacity: usize) -> Self {
        Self {
            window_size,
            capacity,
            windows: Mutex::new(VecDeque::new()),
        }
    }

    fn align(&self, ts: i64) -> i64 {
        ts / self.window_size * self.window_size
    }

    /// Account a classified packet into the window for the current
    /// processing time. Never fails on classified input.
    pub fn ingest(&self, packet: &ClassifiedPacket) {
        self.ingest_at(Utc::now().timestamp(), packet);
    }

    /// Window assignment uses the clock at processing time, not the
    /// packet's capture timestamp.
    pub(crate) fn ingest_at(&self, now: i64, packet: &ClassifiedPacket) {
        let window_ts = self.align(now);
        let mut windows = self.windows.lock().unwrap();

        let needs_new = windows.back().map(|w| w.start != window_ts).unwrap_or(true);
        if needs_new {
            windows.push_back(TimeWindow::new(window_ts));
        }

        let window = windows.back_mut().unwrap(); // appended above when empty
        let entry = window.clients.entry(packet.client).or_default();
        match packet.direction {
            Direction::In => entry.bytes_in += packet.bytes,
            Direction::Out => entry.bytes_out += packet.bytes,
        }
        *entry.protocols.entry(packet.protocol).or_insert(0) += packet.bytes;
    }

    /// Snapshot of the newest window, or an empty window stamped with the
    /// current aligned timestamp when nothing has been ingested yet.
    pub fn latest(&self) -> TimeWindow {
        self.latest_at(Utc::now().timestamp())
    }

    pub(crate) fn latest_at(&self, now: i64) -> TimeWindow {
        let windows = self.windows.lock().unwrap();
        windows
            .back()
            .cloned()
            .unwrap_or_else(|| TimeWindow::new(self.align(now)))
    }

    /// Snapshots of the last `min(n, len)` windows in arrival order, most
    /// recent last.
    pub fn history(&self, n: usize) -> Vec<TimeWindow> {
        let windows = self.windows.lock().unwrap();
        let skip = windows.len().saturating_sub(n);
        windows.iter().skip(skip).cloned().collect()
    }

    /// Protocol histogram for one client in one retained window. The client
    /// arrives as the wire string; an address that does not parse cannot
    /// name a tracked client, but the window is still checked first so the
    /// not-found reason stays accurate.
    pub fn drilldown(
        &self,
        start: i64,
        client: &str,
    ) -> Result<HashMap<ProtocolLabel, u64>, QueryError> {
        let windows = self.windows.lock().unwrap();
        let window = windows
            .iter()
            .find(|w| w.start == start)
            .ok_or(QueryError::WindowNotFound(start))?;
        let counters = client
            .parse::<IpAddr>()
            .ok()
            .and_then(|ip| window.clients.get(&ip))
            .ok_or_else(|| QueryError::ClientNotFound {
                start,
                client: client.to_string(),
            })?;
        Ok(counters.protocols.clone())
    }

    /// Drop windows from the front until at most `capacity` remain.
    /// Idempotent; returns how many were evicted.
    pub fn evict_to_capacity(&self) -> usize {
        let mut windows = self.windows.lock().unwrap();
        let mut evicted = 0;
        while windows.len() > self.capacity {
            windows.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.windows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
