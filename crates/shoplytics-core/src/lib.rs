//! Core domain for the shoplytics pipeline: session/event records, rollup
//! rows, the storage trait, and the tracking/aggregation/query services.

pub mod aggregation;
pub mod config;
pub mod event;
pub mod query;
pub mod session;
pub mod stats;
pub mod store;
pub mod tracking;
