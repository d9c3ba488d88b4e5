//! Tracking service.
//!
//! Front door for everything a hunt does: session lifecycle, position
//! checks, skips, resets, and the completion pipeline that feeds stats
//! and badges. Both the socket and REST surfaces call into here.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::engine::{ProximityEngine, ProximityOutcome};
use super::protocol::{
    ClueBrief, CompletionSummary, DestinationInfo, LiveStats, LocationCheck, Navigation,
};
use super::registry::SessionRegistry;
use super::types::{
    Clue, ClueProgress, Coordinates, Mission, ProgressSummary, TrackingSession,
    DEFAULT_CLUE_RADIUS_M,
};
use crate::geo::{format_distance, navigation_message};
use crate::progression::badges::{BadgeManager, BadgeStanding, JournalCounter};
use crate::progression::stats::{StatsOverview, StatsTracker};
use crate::storage::{HuntStore, StorageError};

/// Result of opening a session.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub session: TrackingSession,
    pub mission: Mission,
    pub progress: ProgressSummary,
}

/// Result of skipping a clue.
#[derive(Debug, Clone, Serialize)]
pub struct SkipResult {
    pub skipped: ClueBrief,
    pub progress: ProgressSummary,
}

/// A mission with its clues and, when a hunter is given, their progress.
#[derive(Debug, Clone, Serialize)]
pub struct MissionDetail {
    pub mission: Mission,
    pub clues: Vec<Clue>,
    pub completed_clue_ids: Vec<Uuid>,
    pub progress: Option<ProgressSummary>,
}

/// One clue found near a queried position.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyClue {
    pub clue: Clue,
    pub mission_title: String,
    pub distance_m: f64,
    pub formatted_distance: String,
}

/// Service tunables, usually sourced from the config file.
#[derive(Debug, Clone, Copy)]
pub struct TrackingTunables {
    /// Arrival radius around the mission destination, meters.
    pub destination_radius_m: f64,
    /// Search radius for nearby-clue queries when none is given, meters.
    pub nearby_radius_m: f64,
    /// Detection radius for appended clues that do not specify one, meters.
    pub clue_radius_m: f64,
}

impl Default for TrackingTunables {
    fn default() -> Self {
        Self {
            destination_radius_m: 30.0,
            nearby_radius_m: 5000.0,
            clue_radius_m: DEFAULT_CLUE_RADIUS_M,
        }
    }
}

/// Tracking service.
pub struct TrackingService {
    store: Arc<dyn HuntStore>,
    registry: Arc<SessionRegistry>,
    engine: ProximityEngine,
    stats: StatsTracker,
    badges: BadgeManager,
    tunables: TrackingTunables,
}

impl TrackingService {
    pub fn new(
        store: Arc<dyn HuntStore>,
        registry: Arc<SessionRegistry>,
        journals: Arc<dyn JournalCounter>,
        tunables: TrackingTunables,
    ) -> Self {
        Self {
            engine: ProximityEngine::new(tunables.destination_radius_m),
            stats: StatsTracker::new(store.clone()),
            badges: BadgeManager::new(store.clone(), journals),
            store,
            registry,
            tunables,
        }
    }

    /// Detection radius for clues appended without an explicit one.
    pub fn default_clue_radius(&self) -> f64 {
        self.tunables.clue_radius_m
    }

    /// Seed the badge catalog. Called once at startup.
    pub fn initialize(&self) -> Result<(), StorageError> {
        self.badges.initialize_badges()
    }

    /// Open a live session for a hunter on a mission.
    pub fn start_session(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<SessionStart, TrackingError> {
        let mission = self.mission_or_err(mission_id)?;

        if !mission.is_active {
            return Err(TrackingError::Policy("mission is not active".to_string()));
        }

        let clues = self.store.mission_clues(mission_id)?;
        let completed = self.store.completed_clue_ids(hunter_id, mission_id)?;
        let progress = self.engine.progress(&clues, &completed);

        let session = self.registry.start_session(hunter_id, mission_id);

        tracing::info!(
            "Session started: hunter {} on mission {}",
            hunter_id,
            mission_id
        );

        Ok(SessionStart {
            session,
            mission,
            progress,
        })
    }

    /// Close a hunter's live session and return its final state.
    pub fn stop_session(&self, hunter_id: Uuid) -> Option<TrackingSession> {
        let stopped = self.registry.stop_session(hunter_id);

        if let Some(session) = &stopped {
            tracing::info!(
                "Session stopped: hunter {} walked {:.0} m",
                hunter_id,
                session.odometer_m
            );
        }

        stopped
    }

    /// Fold a position fix into the hunter's live session odometer.
    /// Returns None when no session is active.
    pub fn record_fix(&self, hunter_id: Uuid, position: Coordinates, speed: f64) -> Option<LiveStats> {
        self.registry
            .update_position(hunter_id, position)
            .map(|reading| LiveStats {
                total_distance_traveled: reading.odometer_m,
                formatted: format_distance(reading.odometer_m),
                speed,
            })
    }

    /// Evaluate a position against a hunter's progress on a mission,
    /// recording whatever the fix proves: a reached clue, or the
    /// completed mission. Safe to call repeatedly with the same fix.
    pub fn check_location(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
        position: Coordinates,
    ) -> Result<LocationCheck, TrackingError> {
        validate_position(position)?;

        let mission = self.mission_or_err(mission_id)?;
        let clues = self.store.mission_clues(mission_id)?;
        let mut completed = self.store.completed_clue_ids(hunter_id, mission_id)?;

        match self.engine.evaluate(&mission, &clues, &completed, position) {
            ProximityOutcome::Seeking { clue, distance_m } => Ok(LocationCheck {
                navigation: Navigation::SearchingClue {
                    clue: ClueBrief::from(&clue),
                    distance_m,
                    formatted_distance: format_distance(distance_m),
                    message: navigation_message(distance_m),
                },
                progress: self.engine.progress(&clues, &completed),
                completion: None,
            }),

            ProximityOutcome::ClueReached { clue, distance_m } => {
                let newly_recorded =
                    self.store.record_clue_if_absent(hunter_id, &clue, distance_m)?;

                if newly_recorded {
                    tracing::info!(
                        "Clue reached: hunter {} found {:?} at {:.0} m",
                        hunter_id,
                        clue.name,
                        distance_m
                    );
                }

                completed.insert(clue.id);

                Ok(LocationCheck {
                    navigation: Navigation::ClueReached {
                        message: format!("You found {}!", clue.name),
                        clue: ClueBrief::from(&clue),
                        distance_m,
                        points: clue.points,
                        newly_recorded,
                    },
                    progress: self.engine.progress(&clues, &completed),
                    completion: None,
                })
            }

            ProximityOutcome::SeekingDestination { distance_m } => Ok(LocationCheck {
                navigation: Navigation::HeadingToFinish {
                    destination: DestinationInfo {
                        location_name: mission.location_name.clone(),
                        latitude: mission.latitude,
                        longitude: mission.longitude,
                    },
                    distance_m,
                    formatted_distance: format_distance(distance_m),
                    message: navigation_message(distance_m),
                },
                progress: self.engine.progress(&clues, &completed),
                completion: None,
            }),

            ProximityOutcome::Arrived { distance_m } => {
                let completion = self.complete_mission(hunter_id, &mission)?;

                Ok(LocationCheck {
                    navigation: Navigation::AllCluesCompleted {
                        distance_m,
                        message: "Mission complete! You reached the destination.".to_string(),
                    },
                    progress: self.engine.progress(&clues, &completed),
                    completion,
                })
            }
        }
    }

    /// Skip the currently targeted clue. The last remaining required clue
    /// cannot be skipped; nothing is written when the policy rejects.
    pub fn skip_current_clue(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<SkipResult, TrackingError> {
        self.mission_or_err(mission_id)?;

        let clues = self.store.mission_clues(mission_id)?;
        let mut completed = self.store.completed_clue_ids(hunter_id, mission_id)?;

        let remaining = clues
            .iter()
            .filter(|c| c.required && !completed.contains(&c.id))
            .count();

        let target = match self.engine.next_target(&clues, &completed) {
            Some(clue) => clue,
            None => {
                return Err(TrackingError::Policy(
                    "no clue left to skip".to_string(),
                ))
            }
        };

        if remaining <= 1 {
            return Err(TrackingError::Policy(
                "the last clue cannot be skipped".to_string(),
            ));
        }

        self.store.record_clue_if_absent(hunter_id, target, 0.0)?;
        completed.insert(target.id);

        tracing::info!(
            "Clue skipped: hunter {} skipped {:?}",
            hunter_id,
            target.name
        );

        Ok(SkipResult {
            skipped: ClueBrief::from(target),
            progress: self.engine.progress(&clues, &completed),
        })
    }

    /// Wipe a hunter's ledger and completion marker for a mission so the
    /// hunt can be replayed from scratch. Lifetime stats already earned
    /// are untouched. Returns the number of ledger rows removed.
    pub fn reset_progress(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<usize, TrackingError> {
        self.mission_or_err(mission_id)?;

        let removed = self.store.clear_progress(hunter_id, mission_id)?;
        self.store.clear_completion(hunter_id, mission_id)?;

        tracing::info!(
            "Progress reset: hunter {} on mission {} ({} rows)",
            hunter_id,
            mission_id,
            removed
        );

        Ok(removed)
    }

    /// Mission with clues, plus the hunter's progress when one is given.
    pub fn mission_detail(
        &self,
        mission_id: Uuid,
        hunter_id: Option<Uuid>,
    ) -> Result<MissionDetail, TrackingError> {
        let mission = self.mission_or_err(mission_id)?;
        let clues = self.store.mission_clues(mission_id)?;

        let (completed_clue_ids, progress) = match hunter_id {
            Some(hunter_id) => {
                let completed = self.store.completed_clue_ids(hunter_id, mission_id)?;
                let progress = self.engine.progress(&clues, &completed);
                (completed.into_iter().collect(), Some(progress))
            }
            None => (Vec::new(), None),
        };

        Ok(MissionDetail {
            mission,
            clues,
            completed_clue_ids,
            progress,
        })
    }

    /// All active missions.
    pub fn active_missions(&self) -> Result<Vec<Mission>, TrackingError> {
        Ok(self.store.active_missions()?)
    }

    /// Create a mission.
    pub fn create_mission(&self, mission: &Mission) -> Result<(), TrackingError> {
        self.store.insert_mission(mission)?;
        Ok(())
    }

    /// Append a clue to a mission. Orders must stay unique.
    pub fn add_clue(&self, clue: Clue) -> Result<Clue, TrackingError> {
        self.mission_or_err(clue.mission_id)?;

        let clues = self.store.mission_clues(clue.mission_id)?;
        if clues.iter().any(|c| c.clue_order == clue.clue_order) {
            return Err(TrackingError::Validation(format!(
                "clue order {} is already used",
                clue.clue_order
            )));
        }

        self.store.insert_clue(&clue)?;
        Ok(clue)
    }

    /// Raw ledger rows for one hunter on one mission.
    pub fn progress_entries(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<Vec<ClueProgress>, TrackingError> {
        self.mission_or_err(mission_id)?;
        Ok(self.store.clue_progress(hunter_id, mission_id)?)
    }

    /// Clues of active missions within a radius of a position, nearest
    /// first.
    pub fn nearby_clues(
        &self,
        position: Coordinates,
        radius_m: Option<f64>,
    ) -> Result<Vec<NearbyClue>, TrackingError> {
        validate_position(position)?;
        let radius_m = radius_m.unwrap_or(self.tunables.nearby_radius_m);

        let mut nearby: Vec<NearbyClue> = self
            .store
            .active_clues()?
            .into_iter()
            .filter_map(|(clue, mission_title)| {
                let distance_m = position.distance_to(clue.position());
                if distance_m <= radius_m {
                    Some(NearbyClue {
                        formatted_distance: format_distance(distance_m),
                        clue,
                        mission_title,
                        distance_m,
                    })
                } else {
                    None
                }
            })
            .collect();

        nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

        Ok(nearby)
    }

    /// Lifetime stats view for a hunter.
    pub fn stats_overview(&self, hunter_id: Uuid) -> Result<StatsOverview, TrackingError> {
        Ok(self.stats.overview(hunter_id)?)
    }

    /// Badge catalog with the hunter's earned state.
    pub fn badge_board(&self, hunter_id: Uuid) -> Result<Vec<BadgeStanding>, TrackingError> {
        Ok(self.badges.badge_board(hunter_id)?)
    }

    fn mission_or_err(&self, mission_id: Uuid) -> Result<Mission, TrackingError> {
        self.store
            .mission(mission_id)?
            .ok_or(TrackingError::MissionNotFound(mission_id))
    }

    /// Completion pipeline, gated by the durable marker: runs the stats
    /// update and badge checks exactly once per (hunter, mission).
    fn complete_mission(
        &self,
        hunter_id: Uuid,
        mission: &Mission,
    ) -> Result<Option<CompletionSummary>, TrackingError> {
        if !self.store.record_completion_if_absent(hunter_id, mission.id)? {
            return Ok(None);
        }

        let distance_km = self.credited_distance_km(hunter_id, mission);
        let stats = self.stats.record_mission(hunter_id, distance_km)?;

        // Badge trouble must not fail the completion itself.
        let new_badges = match self.badges.check_and_award(hunter_id, &stats, mission.category) {
            Ok(badges) => badges,
            Err(e) => {
                tracing::warn!("Badge check failed for hunter {}: {}", hunter_id, e);
                Vec::new()
            }
        };

        tracing::info!(
            "Mission completed: hunter {} finished {:?} (+{} points, {} new badges)",
            hunter_id,
            mission.title,
            mission.points,
            new_badges.len()
        );

        Ok(Some(CompletionSummary {
            mission_id: mission.id,
            mission_title: mission.title.clone(),
            points: mission.points,
            distance_km,
            stats,
            new_badges,
        }))
    }

    /// Distance credited to lifetime stats: the live odometer when the
    /// session for this mission recorded real movement, otherwise the
    /// mission's estimate.
    fn credited_distance_km(&self, hunter_id: Uuid, mission: &Mission) -> f64 {
        match self.registry.session(hunter_id) {
            Some(s) if s.mission_id == mission.id && s.odometer_m > 0.0 => s.odometer_m / 1000.0,
            _ => mission.estimated_distance_km,
        }
    }
}

fn validate_position(position: Coordinates) -> Result<(), TrackingError> {
    if !(-90.0..=90.0).contains(&position.latitude)
        || !(-180.0..=180.0).contains(&position.longitude)
    {
        return Err(TrackingError::Validation(format!(
            "coordinates out of range: {}, {}",
            position.latitude, position.longitude
        )));
    }

    Ok(())
}

/// Tracking errors.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Mission not found: {0}")]
    MissionNotFound(Uuid),

    #[error("No active session")]
    NoSession,

    #[error("Not allowed: {0}")]
    Policy(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
