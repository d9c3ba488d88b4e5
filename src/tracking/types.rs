//! Core types for missions, clues, and live tracking sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo;

/// Detection radius used when an appended clue does not specify one.
pub const DEFAULT_CLUE_RADIUS_M: f64 = 50.0;

/// Points reward used when an appended clue does not specify one.
pub const DEFAULT_CLUE_POINTS: i64 = 5;

/// A GPS coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whole-meter great-circle distance to another coordinate.
    pub fn distance_to(&self, other: Coordinates) -> f64 {
        geo::distance_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Mission category labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionCategory {
    /// Food and drink hunts
    Culinary,
    /// Parks and leisure spots
    Recreation,
    /// Galleries, theatres, street art
    ArtsCulture,
    /// Historical sites and monuments
    History,
    /// Markets and shopping districts
    Shopping,
    /// Outdoor and nature trails
    Nature,
}

impl MissionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionCategory::Culinary => "culinary",
            MissionCategory::Recreation => "recreation",
            MissionCategory::ArtsCulture => "arts_culture",
            MissionCategory::History => "history",
            MissionCategory::Shopping => "shopping",
            MissionCategory::Nature => "nature",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "culinary" => Some(MissionCategory::Culinary),
            "recreation" => Some(MissionCategory::Recreation),
            "arts_culture" => Some(MissionCategory::ArtsCulture),
            "history" => Some(MissionCategory::History),
            "shopping" => Some(MissionCategory::Shopping),
            "nature" => Some(MissionCategory::Nature),
            _ => None,
        }
    }
}

impl std::fmt::Display for MissionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mission difficulty label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// A scavenger hunt mission.
///
/// Immutable while a tracking session is live; the destination is where the
/// player must physically arrive after clearing every required clue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: MissionCategory,
    /// Display name of the final destination.
    pub location_name: String,
    /// Final destination coordinate.
    pub latitude: f64,
    pub longitude: f64,
    /// Static route estimate, used for stats when no odometer is available.
    pub estimated_distance_km: f64,
    pub difficulty: Difficulty,
    /// Points awarded on mission completion.
    pub points: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Mission {
    pub fn destination(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// An ordered geographic checkpoint within a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clue {
    pub id: Uuid,
    pub mission_id: Uuid,
    /// 1-based position within the mission, unique per mission.
    pub clue_order: i64,
    pub name: String,
    pub description: Option<String>,
    pub hint: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Geofence radius in meters.
    pub radius_m: f64,
    pub image_url: Option<String>,
    /// Points awarded when the clue is reached.
    pub points: i64,
    /// Required clues gate progress toward the destination.
    pub required: bool,
    pub created_at: DateTime<Utc>,
}

impl Clue {
    /// Create a clue with default radius, points, and required flag.
    pub fn new(mission_id: Uuid, clue_order: i64, name: String, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            mission_id,
            clue_order,
            name,
            description: None,
            hint: None,
            latitude,
            longitude,
            radius_m: DEFAULT_CLUE_RADIUS_M,
            image_url: None,
            points: DEFAULT_CLUE_POINTS,
            required: true,
            created_at: Utc::now(),
        }
    }

    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Durable record that a hunter reached a clue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueProgress {
    pub id: Uuid,
    pub hunter_id: Uuid,
    pub mission_id: Uuid,
    pub clue_id: Uuid,
    pub reached_at: DateTime<Utc>,
    /// Measured distance from the clue at the moment of arrival; 0 for skips.
    pub distance_m: f64,
}

/// Required-clue progress counters for a (hunter, mission) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    /// Order of the clue currently targeted, if any remain.
    pub next_order: Option<i64>,
}

/// Live per-connection tracking state. Memory-only; the progress ledger is
/// the durable source of truth.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    pub hunter_id: Uuid,
    pub mission_id: Uuid,
    /// Accumulated real-world distance in meters, noise-filtered.
    pub odometer_m: f64,
    pub last_position: Option<Coordinates>,
    pub started_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl TrackingSession {
    pub fn new(hunter_id: Uuid, mission_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            hunter_id,
            mission_id,
            odometer_m: 0.0,
            last_position: None,
            started_at: now,
            last_seen: now,
        }
    }
}
