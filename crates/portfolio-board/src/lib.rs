//! Weighted funding decision model, board decision ledger, and the HTTP plumbing around them.

pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod workflows;
