//! Per-client, per-protocol traffic aggregation for a single monitored
//! host.
//!
//! Packets flow from a capture collaborator ([`sniff`] or [`synth`])
//! through the [`classify`] step into the [`store::WindowStore`], which
//! buckets byte counts into fixed-duration time windows. The [`query`]
//! service reads defensive snapshots of that state and the [`dashboard`]
//! module serves them over HTTP for a polling frontend.

pub mod classify;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod query;
pub mod sniff;
pub mod store;
pub mod synth;
