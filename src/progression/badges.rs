//! Badge and achievement management.
//!
//! Seeds badge definitions, checks requirements after each mission
//! completion, and unlocks anything newly earned.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::types::{default_badges, Badge, BadgeContext, EarnedBadge, HunterStats};
use crate::storage::{HuntStore, StorageError};
use crate::tracking::types::MissionCategory;

/// Source of a hunter's journal entry count.
///
/// Journals live outside this engine; badge checks only need the count,
/// so the lookup sits behind a trait.
pub trait JournalCounter: Send + Sync {
    fn journal_count(&self, hunter_id: Uuid) -> i64;
}

/// Counter used when no journal service is attached. Journal badges stay
/// locked.
pub struct NoJournals;

impl JournalCounter for NoJournals {
    fn journal_count(&self, _hunter_id: Uuid) -> i64 {
        0
    }
}

/// One catalog entry with its earned state, for the badge board.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeStanding {
    pub badge: Badge,
    pub earned: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Badge manager.
pub struct BadgeManager {
    store: Arc<dyn HuntStore>,
    journals: Arc<dyn JournalCounter>,
}

impl BadgeManager {
    /// Create a new badge manager.
    pub fn new(store: Arc<dyn HuntStore>, journals: Arc<dyn JournalCounter>) -> Self {
        Self { store, journals }
    }

    /// Initialize default badges if not present.
    pub fn initialize_badges(&self) -> Result<(), StorageError> {
        self.store.seed_badges(&default_badges())
    }

    /// Check requirements and unlock badges for a hunter.
    ///
    /// Called after a mission completion. `stats` is the already-updated
    /// stats row; `mission_category` is the category of the mission that
    /// just finished.
    pub fn check_and_award(
        &self,
        hunter_id: Uuid,
        stats: &HunterStats,
        mission_category: MissionCategory,
    ) -> Result<Vec<EarnedBadge>, StorageError> {
        let category_completions = self.store.category_completions(hunter_id, mission_category)?;
        let journal_count = self.journals.journal_count(hunter_id);

        let ctx = BadgeContext {
            stats,
            mission_category,
            category_completions,
            journal_count,
        };

        let earned_ids = self.store.earned_badge_ids(hunter_id)?;
        let mut newly_earned = Vec::new();

        for badge in self.store.all_badges()? {
            if earned_ids.contains(&badge.id) {
                continue;
            }

            if badge.qualifies(&ctx) && self.store.award_badge_if_absent(hunter_id, &badge)? {
                newly_earned.push(EarnedBadge {
                    badge,
                    unlocked_at: Utc::now(),
                });
            }
        }

        Ok(newly_earned)
    }

    /// The whole catalog with earned state for one hunter.
    pub fn badge_board(&self, hunter_id: Uuid) -> Result<Vec<BadgeStanding>, StorageError> {
        let unlocked: HashMap<String, DateTime<Utc>> = self
            .store
            .earned_badges(hunter_id)?
            .into_iter()
            .map(|e| (e.badge.id.clone(), e.unlocked_at))
            .collect();

        Ok(self
            .store
            .all_badges()?
            .into_iter()
            .map(|badge| {
                let unlocked_at = unlocked.get(&badge.id).copied();
                BadgeStanding {
                    earned: unlocked_at.is_some(),
                    unlocked_at,
                    badge,
                }
            })
            .collect())
    }
}
