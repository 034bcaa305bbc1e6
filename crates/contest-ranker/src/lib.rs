//! Ranking engine and service plumbing for scoring competition entries with a
//! three-level compromise-ranking hierarchy.

pub mod config;
pub mod error;
pub mod ranking;
pub mod telemetry;
