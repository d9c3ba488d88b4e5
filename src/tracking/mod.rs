//! Live hunt tracking module
//!
//! Provides proximity evaluation, per-hunter session state, the wire
//! protocol, and the service that ties them to storage.

pub mod engine;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use engine::{ProximityEngine, ProximityOutcome};
pub use protocol::{LocationCheck, Navigation, TrackingMessage};
pub use registry::{OdometerReading, SessionRegistry};
pub use service::{TrackingError, TrackingService, TrackingTunables};
pub use types::*;
