//! Lifetime stats and streak tracking.
//!
//! Every mission completion lands here exactly once; the completion
//! marker in storage gates the call, so a replayed finish signal never
//! double-counts.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::types::HunterStats;
use crate::storage::{HuntStore, StorageError};
use crate::tracking::types::MissionCategory;

/// Fold one mission completion into the stats row.
///
/// Streak rules, all in UTC calendar days:
/// - already active today: totals grow, streak unchanged
/// - last active yesterday: streak extends
/// - anything else (gap or first ever): streak restarts at 1
pub fn apply_completion(stats: &mut HunterStats, distance_km: f64, today: NaiveDate) {
    stats.total_missions += 1;
    stats.total_distance_km += distance_km;

    match stats.last_active_date {
        Some(last) if last == today => {}
        Some(last) if last.succ_opt() == Some(today) => {
            stats.current_streak += 1;
            stats.total_active_days += 1;
        }
        _ => {
            stats.current_streak = 1;
            stats.total_active_days += 1;
        }
    }

    stats.last_active_date = Some(today);

    if stats.current_streak > stats.longest_streak {
        stats.longest_streak = stats.current_streak;
    }
}

/// Per-category slice of the stats view.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: MissionCategory,
    pub completed: i64,
}

/// Read-side stats view. `current_streak` here is the effective value:
/// zero when the stored streak has already lapsed.
#[derive(Debug, Clone, Serialize)]
pub struct StatsOverview {
    pub hunter_id: Uuid,
    pub total_missions: i64,
    pub total_distance_km: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub total_active_days: i64,
    pub last_active_date: Option<NaiveDate>,
    pub categories: Vec<CategoryCount>,
}

/// Stats tracker.
pub struct StatsTracker {
    store: Arc<dyn HuntStore>,
}

impl StatsTracker {
    /// Create a new stats tracker.
    pub fn new(store: Arc<dyn HuntStore>) -> Self {
        Self { store }
    }

    /// Record a completed mission and return the updated stats.
    pub fn record_mission(
        &self,
        hunter_id: Uuid,
        distance_km: f64,
    ) -> Result<HunterStats, StorageError> {
        let today = Utc::now().date_naive();

        self.store.update_hunter_stats(hunter_id, &mut |stats| {
            apply_completion(stats, distance_km, today);
        })
    }

    /// Current stats with the lapsed-streak correction applied.
    pub fn overview(&self, hunter_id: Uuid) -> Result<StatsOverview, StorageError> {
        let stats = self.store.hunter_stats(hunter_id)?;
        let breakdown = self.store.category_breakdown(hunter_id)?;
        let today = Utc::now().date_naive();

        Ok(StatsOverview {
            hunter_id,
            total_missions: stats.total_missions,
            total_distance_km: stats.total_distance_km,
            current_streak: stats.effective_streak(today),
            longest_streak: stats.longest_streak,
            total_active_days: stats.total_active_days,
            last_active_date: stats.last_active_date,
            categories: breakdown
                .into_iter()
                .map(|(category, completed)| CategoryCount {
                    category,
                    completed,
                })
                .collect(),
        })
    }
}
