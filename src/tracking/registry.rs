//! Live tracking session registry.
//!
//! Holds one in-memory session per hunter while a hunt is being tracked.
//! Sessions carry the noise-filtered odometer; the durable progress
//! ledger lives in storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use uuid::Uuid;

use super::types::{Coordinates, TrackingSession};

/// Movement below this many meters between fixes is GPS jitter.
pub const MIN_MOVEMENT_M: f64 = 2.0;

/// Movement above this many meters between fixes is a GPS jump.
pub const MAX_MOVEMENT_M: f64 = 150.0;

/// Sessions idle longer than this are evicted.
pub const IDLE_TIMEOUT_SECS: u64 = 300;

/// Interval for the idle sweep task.
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// Result of folding one position fix into a session.
#[derive(Debug, Clone, Copy)]
pub struct OdometerReading {
    /// Total filtered distance for the session, meters.
    pub odometer_m: f64,
    /// Distance accepted from this fix; zero when filtered out.
    pub moved_m: f64,
}

/// Session registry.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, TrackingSession>>>,
    min_movement_m: f64,
    max_movement_m: f64,
    idle_timeout_secs: u64,
}

impl SessionRegistry {
    /// Create a registry with the default movement filter and timeout.
    pub fn new() -> Self {
        Self::with_limits(MIN_MOVEMENT_M, MAX_MOVEMENT_M, IDLE_TIMEOUT_SECS)
    }

    pub fn with_limits(min_movement_m: f64, max_movement_m: f64, idle_timeout_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            min_movement_m,
            max_movement_m,
            idle_timeout_secs,
        }
    }

    /// Start tracking a mission for a hunter. Any previous session for
    /// the same hunter is replaced.
    pub fn start_session(&self, hunter_id: Uuid, mission_id: Uuid) -> TrackingSession {
        let session = TrackingSession::new(hunter_id, mission_id);

        self.sessions
            .write()
            .unwrap()
            .insert(hunter_id, session.clone());

        session
    }

    /// Get the hunter's session if one is active.
    pub fn session(&self, hunter_id: Uuid) -> Option<TrackingSession> {
        self.sessions.read().unwrap().get(&hunter_id).cloned()
    }

    /// Fold a position fix into the hunter's session.
    ///
    /// The odometer only grows when the step from the previous fix falls
    /// strictly inside the (min, max) movement window; jitter and jumps
    /// are dropped. The fix itself always becomes the new reference
    /// point. Returns None when no session is active.
    pub fn update_position(
        &self,
        hunter_id: Uuid,
        position: Coordinates,
    ) -> Option<OdometerReading> {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions.get_mut(&hunter_id)?;

        let mut moved_m = 0.0;

        if let Some(last) = session.last_position {
            let delta = last.distance_to(position);
            if delta > self.min_movement_m && delta < self.max_movement_m {
                session.odometer_m += delta;
                moved_m = delta;
            }
        }

        session.last_position = Some(position);
        session.last_seen = Utc::now();

        Some(OdometerReading {
            odometer_m: session.odometer_m,
            moved_m,
        })
    }

    /// Stop tracking and return the final session state.
    pub fn stop_session(&self, hunter_id: Uuid) -> Option<TrackingSession> {
        self.sessions.write().unwrap().remove(&hunter_id)
    }

    /// Evict sessions idle beyond the timeout. Returns the evicted
    /// hunters.
    pub fn check_idle(&self) -> Vec<Uuid> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(self.idle_timeout_secs as i64);

        let idle: Vec<Uuid> = self
            .sessions
            .read()
            .unwrap()
            .iter()
            .filter(|(_, s)| (now - s.last_seen) > timeout)
            .map(|(id, _)| *id)
            .collect();

        if !idle.is_empty() {
            let mut sessions = self.sessions.write().unwrap();
            for hunter_id in &idle {
                sessions.remove(hunter_id);
            }
        }

        idle
    }

    /// Number of active sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_replaces_previous_session() {
        let registry = SessionRegistry::new();
        let hunter = Uuid::new_v4();
        let first_mission = Uuid::new_v4();
        let second_mission = Uuid::new_v4();

        registry.start_session(hunter, first_mission);
        registry.update_position(hunter, Coordinates::new(-6.2000, 106.8000));
        registry.update_position(hunter, Coordinates::new(-6.2001, 106.8000));

        let replaced = registry.start_session(hunter, second_mission);
        assert_eq!(replaced.odometer_m, 0.0);
        assert_eq!(registry.session(hunter).unwrap().mission_id, second_mission);
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_odometer_filters_jitter_and_jumps() {
        let registry = SessionRegistry::new();
        let hunter = Uuid::new_v4();
        registry.start_session(hunter, Uuid::new_v4());

        // First fix has no reference point yet.
        let reading = registry
            .update_position(hunter, Coordinates::new(-6.2000, 106.8000))
            .unwrap();
        assert_eq!(reading.odometer_m, 0.0);

        // ~1 m step: jitter, ignored.
        let reading = registry
            .update_position(hunter, Coordinates::new(-6.20001, 106.8000))
            .unwrap();
        assert_eq!(reading.odometer_m, 0.0);
        assert_eq!(reading.moved_m, 0.0);

        // ~11 m step: real movement.
        let reading = registry
            .update_position(hunter, Coordinates::new(-6.20011, 106.8000))
            .unwrap();
        assert!(reading.moved_m > 2.0 && reading.moved_m < 150.0);
        assert_eq!(reading.odometer_m, reading.moved_m);
        let walked = reading.odometer_m;

        // ~220 m step: GPS jump, ignored but still moves the reference.
        let reading = registry
            .update_position(hunter, Coordinates::new(-6.20211, 106.8000))
            .unwrap();
        assert_eq!(reading.moved_m, 0.0);
        assert_eq!(reading.odometer_m, walked);

        // Next ~11 m step from the jumped-to point counts again.
        let reading = registry
            .update_position(hunter, Coordinates::new(-6.20221, 106.8000))
            .unwrap();
        assert!(reading.moved_m > 0.0);
        assert!(reading.odometer_m > walked);
    }

    #[test]
    fn test_update_without_session_is_none() {
        let registry = SessionRegistry::new();
        assert!(registry
            .update_position(Uuid::new_v4(), Coordinates::new(0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_stop_returns_final_state() {
        let registry = SessionRegistry::new();
        let hunter = Uuid::new_v4();
        registry.start_session(hunter, Uuid::new_v4());
        registry.update_position(hunter, Coordinates::new(-6.2000, 106.8000));
        registry.update_position(hunter, Coordinates::new(-6.2001, 106.8000));

        let stopped = registry.stop_session(hunter).unwrap();
        assert!(stopped.odometer_m > 0.0);
        assert!(registry.session(hunter).is_none());
        assert!(registry.stop_session(hunter).is_none());
    }

    #[test]
    fn test_check_idle_evicts_by_timeout() {
        let instant = SessionRegistry::with_limits(MIN_MOVEMENT_M, MAX_MOVEMENT_M, 0);
        let hunter = Uuid::new_v4();
        instant.start_session(hunter, Uuid::new_v4());

        std::thread::sleep(std::time::Duration::from_millis(5));
        let evicted = instant.check_idle();
        assert_eq!(evicted, vec![hunter]);
        assert_eq!(instant.active_count(), 0);

        let patient = SessionRegistry::new();
        patient.start_session(hunter, Uuid::new_v4());
        assert!(patient.check_idle().is_empty());
        assert_eq!(patient.active_count(), 1);
    }
}
