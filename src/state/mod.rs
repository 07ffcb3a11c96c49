//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The controller's lifecycle (idle, running, paused, stopped, completed)
//! - `CrawlSession`: Frontier, download list and counters for one run

mod phase;
mod session;

// Re-export main types
pub use phase::CrawlPhase;
pub use session::CrawlSession;
