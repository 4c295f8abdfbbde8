//! Scheduled football-data synchronization task.
//!
//! Pulls competition, standings and match data from an upstream sports API
//! and upserts a bounded subset into an Appwrite-style document store,
//! staying under a per-invocation request budget.

pub mod classify;
pub mod config;
pub mod model;
pub mod store;
pub mod sync;
pub mod upstream;
