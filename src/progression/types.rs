//! Types for hunter statistics and achievement badges.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tracking::types::MissionCategory;

/// Cumulative per-hunter statistics.
///
/// Mutated only through the stats accumulator, once per mission completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HunterStats {
    pub hunter_id: Uuid,
    pub total_missions: i64,
    /// Lifetime distance in kilometers.
    pub total_distance_km: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
    /// UTC calendar date of the most recent completion.
    pub last_active_date: Option<NaiveDate>,
    pub total_active_days: i64,
    pub updated_at: DateTime<Utc>,
}

impl HunterStats {
    pub fn new(hunter_id: Uuid) -> Self {
        Self {
            hunter_id,
            total_missions: 0,
            total_distance_km: 0.0,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
            total_active_days: 0,
            updated_at: Utc::now(),
        }
    }

    /// Streak as it should be displayed: a streak whose last activity is
    /// older than yesterday has already lapsed, even though the stored
    /// counter is only rewritten on the next completion.
    pub fn effective_streak(&self, today: NaiveDate) -> i64 {
        match self.last_active_date {
            Some(date) if date == today || date.succ_opt() == Some(today) => self.current_streak,
            _ => 0,
        }
    }
}

/// Badge qualification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementType {
    /// Total missions completed
    MissionsCompleted,
    /// Lifetime distance in kilometers
    DistanceTraveled,
    /// Consecutive active days
    StreakDays,
    /// Completions within one mission category
    CategorySpecific,
    /// Journal entries written
    JournalsWritten,
}

impl RequirementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementType::MissionsCompleted => "missions_completed",
            RequirementType::DistanceTraveled => "distance_traveled",
            RequirementType::StreakDays => "streak_days",
            RequirementType::CategorySpecific => "category_specific",
            RequirementType::JournalsWritten => "journals_written",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "missions_completed" => Some(RequirementType::MissionsCompleted),
            "distance_traveled" => Some(RequirementType::DistanceTraveled),
            "streak_days" => Some(RequirementType::StreakDays),
            "category_specific" => Some(RequirementType::CategorySpecific),
            "journals_written" => Some(RequirementType::JournalsWritten),
            _ => None,
        }
    }
}

/// Inputs a badge rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct BadgeContext<'a> {
    pub stats: &'a HunterStats,
    /// Category of the mission just completed.
    pub mission_category: MissionCategory,
    /// The hunter's completion count in that category.
    pub category_completions: i64,
    /// Journal entries authored by the hunter.
    pub journal_count: i64,
}

/// Badge definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub requirement_type: RequirementType,
    pub requirement_value: f64,
    /// Only meaningful for category-specific badges.
    pub requirement_category: Option<MissionCategory>,
}

impl Badge {
    /// Whether the badge's rule is satisfied by the given context.
    pub fn qualifies(&self, ctx: &BadgeContext<'_>) -> bool {
        match self.requirement_type {
            RequirementType::MissionsCompleted => {
                ctx.stats.total_missions >= self.requirement_value as i64
            }
            RequirementType::DistanceTraveled => {
                ctx.stats.total_distance_km >= self.requirement_value
            }
            RequirementType::StreakDays => {
                ctx.stats.current_streak >= self.requirement_value as i64
            }
            RequirementType::CategorySpecific => {
                self.requirement_category == Some(ctx.mission_category)
                    && ctx.category_completions >= self.requirement_value as i64
            }
            RequirementType::JournalsWritten => {
                ctx.journal_count >= self.requirement_value as i64
            }
        }
    }
}

/// Earned badge record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnedBadge {
    pub badge: Badge,
    pub unlocked_at: DateTime<Utc>,
}

/// Default badge definitions.
pub fn default_badges() -> Vec<Badge> {
    vec![
        Badge {
            id: "first_find".to_string(),
            name: "First Find".to_string(),
            description: "Complete your first mission".to_string(),
            icon: "🧭".to_string(),
            requirement_type: RequirementType::MissionsCompleted,
            requirement_value: 1.0,
            requirement_category: None,
        },
        Badge {
            id: "city_explorer".to_string(),
            name: "City Explorer".to_string(),
            description: "Complete 10 missions".to_string(),
            icon: "🗺️".to_string(),
            requirement_type: RequirementType::MissionsCompleted,
            requirement_value: 10.0,
            requirement_category: None,
        },
        Badge {
            id: "pathfinder".to_string(),
            name: "Pathfinder".to_string(),
            description: "Travel 25 km on missions".to_string(),
            icon: "🥾".to_string(),
            requirement_type: RequirementType::DistanceTraveled,
            requirement_value: 25.0,
            requirement_category: None,
        },
        Badge {
            id: "century_walker".to_string(),
            name: "Century Walker".to_string(),
            description: "Travel 100 km on missions".to_string(),
            icon: "💯".to_string(),
            requirement_type: RequirementType::DistanceTraveled,
            requirement_value: 100.0,
            requirement_category: None,
        },
        Badge {
            id: "week_streak".to_string(),
            name: "Week Streak".to_string(),
            description: "Complete missions 7 days in a row".to_string(),
            icon: "📅".to_string(),
            requirement_type: RequirementType::StreakDays,
            requirement_value: 7.0,
            requirement_category: None,
        },
        Badge {
            id: "month_streak".to_string(),
            name: "Month Streak".to_string(),
            description: "Complete missions 30 days in a row".to_string(),
            icon: "🌟".to_string(),
            requirement_type: RequirementType::StreakDays,
            requirement_value: 30.0,
            requirement_category: None,
        },
        Badge {
            id: "street_food_scout".to_string(),
            name: "Street Food Scout".to_string(),
            description: "Complete 5 culinary missions".to_string(),
            icon: "🍜".to_string(),
            requirement_type: RequirementType::CategorySpecific,
            requirement_value: 5.0,
            requirement_category: Some(MissionCategory::Culinary),
        },
        Badge {
            id: "time_traveler".to_string(),
            name: "Time Traveler".to_string(),
            description: "Complete 5 history missions".to_string(),
            icon: "🏛️".to_string(),
            requirement_type: RequirementType::CategorySpecific,
            requirement_value: 5.0,
            requirement_category: Some(MissionCategory::History),
        },
        Badge {
            id: "chronicler".to_string(),
            name: "Chronicler".to_string(),
            description: "Write 10 journal entries".to_string(),
            icon: "✍️".to_string(),
            requirement_type: RequirementType::JournalsWritten,
            requirement_value: 10.0,
            requirement_category: None,
        },
    ]
}
