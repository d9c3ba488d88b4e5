//! Integration tests for the live hunt flow.
//!
//! Drives a full mission through the public API the way the tracking
//! socket does: session start, position fixes through the odometer
//! filter, clue detection, destination arrival, and the completion
//! pipeline.

use std::sync::Arc;

use chrono::Utc;
use trailhunt::progression::badges::NoJournals;
use trailhunt::storage::Database;
use trailhunt::tracking::protocol::Navigation;
use trailhunt::tracking::{
    Clue, Coordinates, Difficulty, Mission, MissionCategory, SessionRegistry, TrackingService,
    TrackingTunables,
};
use uuid::Uuid;

/// Service over an in-memory database with default movement limits.
fn test_service() -> (Arc<SessionRegistry>, TrackingService) {
    let store = Arc::new(Database::open_in_memory().unwrap());
    let registry = Arc::new(SessionRegistry::new());
    let service = TrackingService::new(
        store,
        Arc::clone(&registry),
        Arc::new(NoJournals),
        TrackingTunables::default(),
    );
    service.initialize().unwrap();
    (registry, service)
}

fn make_mission(title: &str, category: MissionCategory) -> Mission {
    Mission {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: Some("Follow the old waterfront".to_string()),
        category,
        location_name: "Maritime Museum".to_string(),
        latitude: -6.2000,
        longitude: 106.8000,
        estimated_distance_km: 1.5,
        difficulty: Difficulty::Medium,
        points: 20,
        is_active: true,
        created_at: Utc::now(),
    }
}

#[test]
fn test_full_hunt_with_live_session() {
    let (_registry, service) = test_service();

    let mission = make_mission("Harbor Heritage Walk", MissionCategory::History);
    service.create_mission(&mission).unwrap();
    service
        .add_clue(Clue::new(
            mission.id,
            1,
            "Rusted Anchor".to_string(),
            -6.2035,
            106.8000,
        ))
        .unwrap();
    service
        .add_clue(Clue::new(
            mission.id,
            2,
            "Harbormaster's Bell".to_string(),
            -6.2020,
            106.8000,
        ))
        .unwrap();

    let hunter = Uuid::new_v4();
    let start = service.start_session(hunter, mission.id).unwrap();
    assert_eq!(start.progress.completed, 0);
    assert_eq!(start.progress.total, 2);
    assert_eq!(start.progress.next_order, Some(1));

    // First fix only sets the odometer reference point.
    let stats = service
        .record_fix(hunter, Coordinates::new(-6.2046, 106.8000), 1.2)
        .unwrap();
    assert_eq!(stats.total_distance_traveled, 0.0);

    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2046, 106.8000))
        .unwrap();
    match &check.navigation {
        Navigation::SearchingClue { clue, distance_m, .. } => {
            assert_eq!(clue.name, "Rusted Anchor");
            assert_eq!(*distance_m, 122.0);
        }
        other => panic!("expected SearchingClue, got {:?}", other),
    }

    // An 11 m step passes the movement filter.
    let stats = service
        .record_fix(hunter, Coordinates::new(-6.2045, 106.8000), 1.2)
        .unwrap();
    assert_eq!(stats.total_distance_traveled, 11.0);

    // Two more steps walk into clue 1's radius.
    service
        .record_fix(hunter, Coordinates::new(-6.2040, 106.8000), 1.3)
        .unwrap();
    let stats = service
        .record_fix(hunter, Coordinates::new(-6.2038, 106.8000), 1.3)
        .unwrap();
    assert_eq!(stats.total_distance_traveled, 89.0);

    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2038, 106.8000))
        .unwrap();
    match &check.navigation {
        Navigation::ClueReached {
            clue,
            points,
            newly_recorded,
            ..
        } => {
            assert_eq!(clue.clue_order, 1);
            assert_eq!(*points, 5);
            assert!(*newly_recorded);
        }
        other => panic!("expected ClueReached, got {:?}", other),
    }
    assert_eq!(check.progress.completed, 1);
    assert!(check.completion.is_none());

    // A 200 m jump lands exactly on clue 2: the clue is detected but the
    // odometer rejects the jump.
    let stats = service
        .record_fix(hunter, Coordinates::new(-6.2020, 106.8000), 1.3)
        .unwrap();
    assert_eq!(stats.total_distance_traveled, 89.0);

    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2020, 106.8000))
        .unwrap();
    assert!(matches!(
        &check.navigation,
        Navigation::ClueReached { clue, .. } if clue.clue_order == 2
    ));
    assert_eq!(check.progress.completed, 2);

    // Every required clue is done; guidance switches to the destination.
    service
        .record_fix(hunter, Coordinates::new(-6.2010, 106.8000), 1.4)
        .unwrap();
    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2010, 106.8000))
        .unwrap();
    match &check.navigation {
        Navigation::HeadingToFinish {
            destination,
            distance_m,
            ..
        } => {
            assert_eq!(destination.location_name, "Maritime Museum");
            assert_eq!(*distance_m, 111.0);
        }
        other => panic!("expected HeadingToFinish, got {:?}", other),
    }

    // Arrival inside the destination radius completes the mission.
    let stats = service
        .record_fix(hunter, Coordinates::new(-6.2001, 106.8000), 1.4)
        .unwrap();
    assert_eq!(stats.total_distance_traveled, 300.0);

    let check = service
        .check_location(hunter, mission.id, Coordinates::new(-6.2001, 106.8000))
        .unwrap();
    assert!(matches!(
        &check.navigation,
        Navigation::AllCluesCompleted { .. }
    ));

    let completion = check.completion.expect("first arrival must complete");
    assert_eq!(completion.mission_title, "Harbor Heritage Walk");
    assert_eq!(completion.points, 20);
    // Credited from the live odometer, not the route estimate.
    assert!((completion.distance_km - 0.3).abs() < 1e-9);
    assert_eq!(completion.stats.total_missions, 1);
    assert!(completion
        .new_badges
        .iter()
        .any(|earned| earned.badge.id == "first_find"));

    // The final odometer survives until the session is stopped.
    let session = service.stop_session(hunter).expect("session still live");
    assert_eq!(session.odometer_m, 300.0);
    assert!(service.stop_session(hunter).is_none());
}

#[test]
fn test_mission_detail_reports_completion_flags() {
    let (_registry, service) = test_service();

    let mission = make_mission("Night Market Crawl", MissionCategory::Culinary);
    service.create_mission(&mission).unwrap();
    let clue = service
        .add_clue(Clue::new(
            mission.id,
            1,
            "Satay Stall".to_string(),
            -6.2035,
            106.8000,
        ))
        .unwrap();
    service
        .add_clue(Clue::new(
            mission.id,
            2,
            "Spice Stand".to_string(),
            -6.2020,
            106.8000,
        ))
        .unwrap();

    let hunter = Uuid::new_v4();
    service
        .check_location(hunter, mission.id, Coordinates::new(-6.2035, 106.8000))
        .unwrap();

    // Without a hunter: just the catalog.
    let detail = service.mission_detail(mission.id, None).unwrap();
    assert_eq!(detail.clues.len(), 2);
    assert!(detail.completed_clue_ids.is_empty());
    assert!(detail.progress.is_none());

    // With the hunter: clue 1 flagged complete, clue 2 up next.
    let detail = service.mission_detail(mission.id, Some(hunter)).unwrap();
    assert_eq!(detail.completed_clue_ids, vec![clue.id]);
    let progress = detail.progress.unwrap();
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.next_order, Some(2));
}

#[test]
fn test_nearby_clues_across_missions() {
    let (_registry, service) = test_service();

    let near = make_mission("Old Town Loop", MissionCategory::History);
    service.create_mission(&near).unwrap();
    service
        .add_clue(Clue::new(
            near.id,
            1,
            "Clock Tower".to_string(),
            -6.2001,
            106.8000,
        ))
        .unwrap();

    let far = make_mission("Hillside Trek", MissionCategory::Nature);
    service.create_mission(&far).unwrap();
    service
        .add_clue(Clue::new(
            far.id,
            1,
            "Summit Marker".to_string(),
            -6.1000,
            106.8000,
        ))
        .unwrap();

    let position = Coordinates::new(-6.2000, 106.8000);

    // Default 5 km radius reaches only the old town clue.
    let nearby = service.nearby_clues(position, None).unwrap();
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].clue.name, "Clock Tower");
    assert_eq!(nearby[0].mission_title, "Old Town Loop");
    assert_eq!(nearby[0].distance_m, 11.0);

    // A wider radius picks up the summit, sorted by distance.
    let nearby = service.nearby_clues(position, Some(20_000.0)).unwrap();
    assert_eq!(nearby.len(), 2);
    assert_eq!(nearby[0].clue.name, "Clock Tower");
    assert_eq!(nearby[1].clue.name, "Summit Marker");
}
