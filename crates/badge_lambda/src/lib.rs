//! AWS-oriented adapters and handlers for badge publishing.
//!
//! This crate owns runtime integration details (Lambda handlers, environment
//! configuration and the S3 storage adapter). Rendering, thresholds and key
//! conventions live in `badge_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
