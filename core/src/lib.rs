//! Dedispersion buffering and single-pulse clustering core for the Rust
//! transient-search platform.
//!
//! The modules mirror the streaming search pipeline while providing safe
//! abstractions: an aggregation layer that assembles variable-rate
//! time-frequency chunks into dedispersion-ready blocks with overlap
//! carry-over, and friends-of-friends clustering that merges single-pulse
//! candidates close to each other in (time, DM, width) space.

pub mod buffering;
pub mod clustering;
pub mod data;
pub mod prelude;
pub mod telemetry;

pub use prelude::{DedispersionPlan, SearchError, SearchResult};
