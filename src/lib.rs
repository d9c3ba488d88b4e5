//! TrailHunt - Location-Based Scavenger Hunt Backend
//!
//! Real-time proximity tracking and progress engine for location-based
//! scavenger hunts. Guides hunters clue by clue toward a mission's
//! destination, keeps an idempotent progress ledger, and rolls finished
//! missions into lifetime stats, streaks, and badges.

pub mod config;
pub mod geo;
pub mod progression;
pub mod server;
pub mod storage;
pub mod tracking;

// Re-export commonly used types
pub use progression::badges::BadgeManager;
pub use progression::stats::StatsTracker;
pub use storage::Database;
pub use tracking::registry::SessionRegistry;
pub use tracking::service::TrackingService;
