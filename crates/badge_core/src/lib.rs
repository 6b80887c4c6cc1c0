//! Coverage badge domain primitives.
//!
//! This crate owns the request contract, color thresholds, SVG rendering and
//! object key conventions. It intentionally excludes AWS SDK and Lambda
//! runtime concerns so the same logic backs every handler and the stack
//! definitions.

pub mod color;
pub mod contract;
pub mod environment;
pub mod render;
pub mod storage_keys;
