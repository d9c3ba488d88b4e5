//! Integration tests for stats, streaks, and badges.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use trailhunt::progression::badges::NoJournals;
use trailhunt::progression::stats::apply_completion;
use trailhunt::storage::{Database, HuntStore};
use trailhunt::tracking::{
    Coordinates, Difficulty, Mission, MissionCategory, SessionRegistry, TrackingService,
    TrackingTunables,
};
use uuid::Uuid;

fn test_service() -> (Arc<Database>, TrackingService) {
    let store = Arc::new(Database::open_in_memory().unwrap());
    let service = TrackingService::new(
        store.clone(),
        Arc::new(SessionRegistry::new()),
        Arc::new(NoJournals),
        TrackingTunables::default(),
    );
    service.initialize().unwrap();
    (store, service)
}

/// Mission with no clues: the first fix at the destination completes it.
fn make_destination_mission(title: &str, category: MissionCategory) -> Mission {
    Mission {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        category,
        location_name: "Plaza".to_string(),
        latitude: -6.2000,
        longitude: 106.8000,
        estimated_distance_km: 1.0,
        difficulty: Difficulty::Easy,
        points: 10,
        is_active: true,
        created_at: Utc::now(),
    }
}

#[test]
fn test_completion_pipeline_idempotent() {
    let (store, service) = test_service();
    let mission = make_destination_mission("Plaza Visit", MissionCategory::Recreation);
    service.create_mission(&mission).unwrap();

    let hunter = Uuid::new_v4();
    let at_plaza = Coordinates::new(-6.2000, 106.8000);

    let first = service.check_location(hunter, mission.id, at_plaza).unwrap();
    let completion = first.completion.expect("first arrival completes");
    assert_eq!(completion.stats.total_missions, 1);
    assert_eq!(completion.new_badges.len(), 1);
    assert_eq!(completion.new_badges[0].badge.id, "first_find");

    // Lingering at the destination must not double-count anything.
    let again = service.check_location(hunter, mission.id, at_plaza).unwrap();
    assert!(again.completion.is_none());

    let stats = store.hunter_stats(hunter).unwrap();
    assert_eq!(stats.total_missions, 1);
    assert_eq!(store.earned_badges(hunter).unwrap().len(), 1);
}

#[test]
fn test_streak_rules_across_days() {
    let (store, _service) = test_service();
    let hunter = Uuid::new_v4();

    let day1 = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
    let gap_day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

    store
        .update_hunter_stats(hunter, &mut |stats| apply_completion(stats, 2.0, day1))
        .unwrap();
    store
        .update_hunter_stats(hunter, &mut |stats| apply_completion(stats, 3.0, day2))
        .unwrap();

    let stats = store.hunter_stats(hunter).unwrap();
    assert_eq!(stats.current_streak, 2);
    assert_eq!(stats.longest_streak, 2);
    assert_eq!(stats.total_active_days, 2);
    assert!((stats.total_distance_km - 5.0).abs() < 1e-9);

    // A three-day gap resets the running streak but not the record.
    let stats = store
        .update_hunter_stats(hunter, &mut |stats| apply_completion(stats, 1.0, gap_day))
        .unwrap();
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 2);
    assert_eq!(stats.total_active_days, 3);

    // Read views collapse a stale streak to zero.
    assert_eq!(stats.effective_streak(gap_day), 1);
    assert_eq!(stats.effective_streak(gap_day.succ_opt().unwrap()), 1);
    let much_later = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
    assert_eq!(stats.effective_streak(much_later), 0);
}

#[test]
fn test_category_specialist_badge() {
    let (_store, service) = test_service();
    let hunter = Uuid::new_v4();
    let at_plaza = Coordinates::new(-6.2000, 106.8000);

    let mut last_badges = Vec::new();
    for i in 1..=5 {
        let mission = make_destination_mission(
            &format!("Food Stop {}", i),
            MissionCategory::Culinary,
        );
        service.create_mission(&mission).unwrap();

        let check = service.check_location(hunter, mission.id, at_plaza).unwrap();
        last_badges = check.completion.expect("arrival completes").new_badges;
    }

    // The fifth culinary finish unlocks the specialist badge.
    assert!(last_badges
        .iter()
        .any(|earned| earned.badge.id == "street_food_scout"));

    let board = service.badge_board(hunter).unwrap();
    let by_id = |id: &str| board.iter().find(|b| b.badge.id == id).unwrap();
    assert!(by_id("first_find").earned);
    assert!(by_id("street_food_scout").earned);
    assert!(!by_id("week_streak").earned);
    assert!(by_id("street_food_scout").unlocked_at.is_some());

    let overview = service.stats_overview(hunter).unwrap();
    assert_eq!(overview.total_missions, 5);
    assert_eq!(overview.current_streak, 1);
    let culinary = overview
        .categories
        .iter()
        .find(|c| c.category == MissionCategory::Culinary)
        .unwrap();
    assert_eq!(culinary.completed, 5);
}
