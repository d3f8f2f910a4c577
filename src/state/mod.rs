//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the controller's lifecycle state machine
//! - `StopReason`: why a crawl ended
//! - `CrawlState`: page counters, budget slots and failure tallies

mod crawl_state;
mod phase;

// Re-export main types
pub use crawl_state::{rate_per_minute, CrawlState, PROGRESS_INTERVAL};
pub use phase::{CrawlPhase, StopReason};
