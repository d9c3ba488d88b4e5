//! Hunter progression module
//!
//! Provides lifetime stats, streak tracking, and badge awards.

pub mod badges;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use badges::{BadgeManager, JournalCounter};
pub use stats::StatsTracker;
pub use types::*;
