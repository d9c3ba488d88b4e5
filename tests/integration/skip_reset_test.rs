//! Integration tests for skipping clues and resetting progress.

use std::sync::Arc;

use chrono::Utc;
use trailhunt::progression::badges::NoJournals;
use trailhunt::storage::Database;
use trailhunt::tracking::protocol::Navigation;
use trailhunt::tracking::{
    Clue, Coordinates, Difficulty, Mission, MissionCategory, SessionRegistry, TrackingError,
    TrackingService, TrackingTunables,
};
use uuid::Uuid;

fn test_service() -> TrackingService {
    let store = Arc::new(Database::open_in_memory().unwrap());
    let service = TrackingService::new(
        store,
        Arc::new(SessionRegistry::new()),
        Arc::new(NoJournals),
        TrackingTunables::default(),
    );
    service.initialize().unwrap();
    service
}

fn make_mission(title: &str) -> Mission {
    Mission {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        category: MissionCategory::Recreation,
        location_name: "Bandstand".to_string(),
        latitude: -6.2000,
        longitude: 106.8000,
        estimated_distance_km: 1.5,
        difficulty: Difficulty::Easy,
        points: 10,
        is_active: true,
        created_at: Utc::now(),
    }
}

#[test]
fn test_skip_advances_to_next_clue() {
    let service = test_service();
    let mission = make_mission("Park Circuit");
    service.create_mission(&mission).unwrap();
    service
        .add_clue(Clue::new(
            mission.id,
            1,
            "Fountain".to_string(),
            -6.2040,
            106.8000,
        ))
        .unwrap();
    service
        .add_clue(Clue::new(
            mission.id,
            2,
            "Rose Garden".to_string(),
            -6.2020,
            106.8000,
        ))
        .unwrap();

    let hunter = Uuid::new_v4();

    let result = service.skip_current_clue(hunter, mission.id).unwrap();
    assert_eq!(result.skipped.clue_order, 1);
    assert_eq!(result.progress.completed, 1);
    assert_eq!(result.progress.next_order, Some(2));

    // The skip lands in the ledger with zero distance.
    let entries = service.progress_entries(hunter, mission.id).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].distance_m, 0.0);

    // Position checks now target clue 2.
    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2050, 106.8000))
        .unwrap();
    assert!(matches!(
        &check.navigation,
        Navigation::SearchingClue { clue, .. } if clue.clue_order == 2
    ));
}

#[test]
fn test_skip_last_required_clue_rejected() {
    let service = test_service();
    let mission = make_mission("Short Stroll");
    service.create_mission(&mission).unwrap();
    service
        .add_clue(Clue::new(
            mission.id,
            1,
            "Fountain".to_string(),
            -6.2040,
            106.8000,
        ))
        .unwrap();
    service
        .add_clue(Clue::new(
            mission.id,
            2,
            "Rose Garden".to_string(),
            -6.2020,
            106.8000,
        ))
        .unwrap();

    // An optional extra beyond the last required clue must not loosen
    // the policy.
    let mut bonus = Clue::new(mission.id, 3, "Mural".to_string(), -6.2010, 106.8000);
    bonus.required = false;
    service.add_clue(bonus).unwrap();

    let hunter = Uuid::new_v4();
    service.skip_current_clue(hunter, mission.id).unwrap();

    let err = service.skip_current_clue(hunter, mission.id).unwrap_err();
    assert!(matches!(err, TrackingError::Policy(_)));

    // The rejected skip wrote nothing.
    let entries = service.progress_entries(hunter, mission.id).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_reset_clears_ledger_and_allows_replay() {
    let service = test_service();
    let mission = make_mission("Lakeside Dash");
    service.create_mission(&mission).unwrap();
    service
        .add_clue(Clue::new(
            mission.id,
            1,
            "Boathouse".to_string(),
            -6.2020,
            106.8000,
        ))
        .unwrap();

    let hunter = Uuid::new_v4();

    // First run: clue, then destination.
    service
        .check_location(hunter, mission.id, Coordinates::new(-6.2020, 106.8000))
        .unwrap();
    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2000, 106.8000))
        .unwrap();
    let completion = check.completion.expect("first run completes");
    assert_eq!(completion.stats.total_missions, 1);

    let removed = service.reset_progress(hunter, mission.id).unwrap();
    assert_eq!(removed, 1);
    assert!(service
        .progress_entries(hunter, mission.id)
        .unwrap()
        .is_empty());

    // Replay: the mission can be finished again and counts again.
    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2020, 106.8000))
        .unwrap();
    assert!(matches!(
        &check.navigation,
        Navigation::ClueReached { newly_recorded: true, .. }
    ));

    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2000, 106.8000))
        .unwrap();
    let completion = check.completion.expect("replay completes");
    assert_eq!(completion.stats.total_missions, 2);

    // Lifetime badges do not re-fire on the replay.
    assert!(completion.new_badges.is_empty());
}
