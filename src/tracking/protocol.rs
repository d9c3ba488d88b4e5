//! Wire protocol for live tracking.
//!
//! Defines the JSON message types exchanged over the tracking socket,
//! plus the payload shapes shared with the REST surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{Clue, ProgressSummary};
use crate::progression::types::{EarnedBadge, HunterStats};

/// Clue fields exposed to clients while hunting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueBrief {
    pub id: Uuid,
    pub name: String,
    pub clue_order: i64,
    pub hint: Option<String>,
}

impl From<&Clue> for ClueBrief {
    fn from(clue: &Clue) -> Self {
        Self {
            id: clue.id,
            name: clue.name.clone(),
            clue_order: clue.clue_order,
            hint: clue.hint.clone(),
        }
    }
}

/// Finish-point details shown once every required clue is done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationInfo {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Where the hunter stands after a position fix, with guidance text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Navigation {
    /// Still outside the targeted clue's radius.
    SearchingClue {
        clue: ClueBrief,
        distance_m: f64,
        formatted_distance: String,
        message: String,
    },

    /// The fix landed inside the targeted clue's radius.
    ClueReached {
        clue: ClueBrief,
        distance_m: f64,
        points: i64,
        message: String,
        /// False when this clue was already on the ledger.
        newly_recorded: bool,
    },

    /// Every required clue is done; guiding to the destination.
    HeadingToFinish {
        destination: DestinationInfo,
        distance_m: f64,
        formatted_distance: String,
        message: String,
    },

    /// The hunter arrived at the destination.
    AllCluesCompleted { distance_m: f64, message: String },
}

/// Session odometer stats echoed with every tracking update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStats {
    /// Meters accumulated by the noise-filtered odometer.
    pub total_distance_traveled: f64,
    pub formatted: String,
    /// Client-reported speed in m/s, passed through untouched.
    pub speed: f64,
}

/// Payload sent once when a mission finishes for the first time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub mission_id: Uuid,
    pub mission_title: String,
    pub points: i64,
    /// Distance credited to lifetime stats, in kilometers.
    pub distance_km: f64,
    pub stats: HunterStats,
    pub new_badges: Vec<EarnedBadge>,
}

/// Everything one position check produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCheck {
    pub navigation: Navigation,
    pub progress: ProgressSummary,
    /// Present only on the fix that completed the mission.
    pub completion: Option<CompletionSummary>,
}

/// Kind of durable progress a mission event announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionEventKind {
    ClueReached,
    MissionCompleted,
}

/// Messages exchanged over the tracking socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingMessage {
    /// Client opens a hunt session.
    StartSession { hunter_id: Uuid, mission_id: Uuid },

    /// Server confirms the session is live.
    SessionStarted {
        status: String,
        mission_id: Uuid,
        mission_title: String,
        progress: ProgressSummary,
    },

    /// Client position fix.
    LocationUpdate {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        speed: f64,
    },

    /// Server guidance after each fix.
    TrackingUpdate {
        live_stats: LiveStats,
        navigation: Navigation,
        progress: ProgressSummary,
    },

    /// Server notification when progress was durably recorded. Replays
    /// of an already-recorded clue or finish do not produce one.
    MissionEvent {
        event: MissionEventKind,
        clue: Option<ClueBrief>,
        points: Option<i64>,
        completion: Option<CompletionSummary>,
    },

    /// Client ends the session.
    StopSession,

    /// Server error report.
    Error { message: String },
}

impl TrackingMessage {
    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a JSON text frame.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_frames() {
        let frame = r#"{"type":"start_session",
            "hunter_id":"6f9fe087-7bd1-4f54-87d4-00a1a40b35b6",
            "mission_id":"1f0b19b2-60c5-45a0-b9a6-67fe6a3c26b1"}"#;

        match TrackingMessage::from_json(frame).unwrap() {
            TrackingMessage::StartSession { hunter_id, .. } => {
                assert_eq!(
                    hunter_id.to_string(),
                    "6f9fe087-7bd1-4f54-87d4-00a1a40b35b6"
                );
            }
            other => panic!("expected StartSession, got {:?}", other),
        }

        // Speed is optional on position fixes.
        let frame = r#"{"type":"location_update","latitude":-6.2,"longitude":106.8}"#;
        match TrackingMessage::from_json(frame).unwrap() {
            TrackingMessage::LocationUpdate { speed, .. } => assert_eq!(speed, 0.0),
            other => panic!("expected LocationUpdate, got {:?}", other),
        }

        let frame = r#"{"type":"stop_session"}"#;
        assert!(matches!(
            TrackingMessage::from_json(frame).unwrap(),
            TrackingMessage::StopSession
        ));
    }

    #[test]
    fn test_tracking_update_wire_shape() {
        let message = TrackingMessage::TrackingUpdate {
            live_stats: LiveStats {
                total_distance_traveled: 410.0,
                formatted: "410 m".to_string(),
                speed: 1.4,
            },
            navigation: Navigation::SearchingClue {
                clue: ClueBrief {
                    id: Uuid::new_v4(),
                    name: "Fountain".to_string(),
                    clue_order: 1,
                    hint: Some("Listen for water".to_string()),
                },
                distance_m: 230.0,
                formatted_distance: "230 m".to_string(),
                message: "Still 230 m to go.".to_string(),
            },
            progress: ProgressSummary {
                completed: 0,
                total: 3,
                next_order: Some(1),
            },
        };

        let value: serde_json::Value =
            serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "tracking_update");
        assert_eq!(value["navigation"]["status"], "searching_clue");
        assert_eq!(value["navigation"]["clue"]["name"], "Fountain");
        assert_eq!(value["progress"]["total"], 3);
        assert_eq!(value["live_stats"]["speed"], 1.4);
    }

    #[test]
    fn test_mission_event_kind_names() {
        let message = TrackingMessage::MissionEvent {
            event: MissionEventKind::MissionCompleted,
            clue: None,
            points: Some(10),
            completion: None,
        };

        let value: serde_json::Value =
            serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "mission_event");
        assert_eq!(value["event"], "mission_completed");
    }
}
