//! Persistence layer: SQLite behind a repository trait.

pub mod database;
pub mod schema;

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::progression::types::{Badge, EarnedBadge, HunterStats};
use crate::tracking::types::{Clue, ClueProgress, Mission, MissionCategory};

pub use database::Database;

/// Repository contract for everything the tracking engine persists.
///
/// The uniqueness-backed `*_if_absent` operations and the transactional
/// stats read-modify-write are the two primitives that keep concurrent
/// arrival signals from double-applying; everything else is plain reads.
pub trait HuntStore: Send + Sync {
    fn mission(&self, id: Uuid) -> Result<Option<Mission>, StorageError>;

    fn active_missions(&self) -> Result<Vec<Mission>, StorageError>;

    fn insert_mission(&self, mission: &Mission) -> Result<(), StorageError>;

    /// Clues of a mission, ordered by ascending `clue_order`.
    fn mission_clues(&self, mission_id: Uuid) -> Result<Vec<Clue>, StorageError>;

    fn insert_clue(&self, clue: &Clue) -> Result<(), StorageError>;

    /// Clues of all active missions, paired with their mission's title.
    fn active_clues(&self) -> Result<Vec<(Clue, String)>, StorageError>;

    /// Record that a hunter reached a clue, unless already recorded.
    /// Returns true when a new row was written.
    fn record_clue_if_absent(
        &self,
        hunter_id: Uuid,
        clue: &Clue,
        distance_m: f64,
    ) -> Result<bool, StorageError>;

    fn completed_clue_ids(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<HashSet<Uuid>, StorageError>;

    fn clue_progress(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<Vec<ClueProgress>, StorageError>;

    /// Delete all ledger rows for the pair. Returns the number removed.
    fn clear_progress(&self, hunter_id: Uuid, mission_id: Uuid) -> Result<usize, StorageError>;

    /// Record a mission completion, unless already recorded. Returns true
    /// when this call created the marker.
    fn record_completion_if_absent(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<bool, StorageError>;

    /// Remove the completion marker so the mission can be replayed.
    fn clear_completion(&self, hunter_id: Uuid, mission_id: Uuid) -> Result<(), StorageError>;

    /// Completion count for the hunter within one category.
    fn category_completions(
        &self,
        hunter_id: Uuid,
        category: MissionCategory,
    ) -> Result<i64, StorageError>;

    /// Completion counts per category, for the stats view.
    fn category_breakdown(
        &self,
        hunter_id: Uuid,
    ) -> Result<Vec<(MissionCategory, i64)>, StorageError>;

    /// Current stats, or zeroed defaults for an unseen hunter.
    fn hunter_stats(&self, hunter_id: Uuid) -> Result<HunterStats, StorageError>;

    /// Atomic read-modify-write of a hunter's stats row. The closure runs
    /// inside the transaction; the stored row after commit is returned.
    fn update_hunter_stats(
        &self,
        hunter_id: Uuid,
        apply: &mut dyn FnMut(&mut HunterStats),
    ) -> Result<HunterStats, StorageError>;

    fn all_badges(&self) -> Result<Vec<Badge>, StorageError>;

    /// Insert badge definitions that are not present yet.
    fn seed_badges(&self, badges: &[Badge]) -> Result<(), StorageError>;

    fn earned_badge_ids(&self, hunter_id: Uuid) -> Result<HashSet<String>, StorageError>;

    fn earned_badges(&self, hunter_id: Uuid) -> Result<Vec<EarnedBadge>, StorageError>;

    /// Award a badge, unless already earned. Returns true when a new row
    /// was written.
    fn award_badge_if_absent(&self, hunter_id: Uuid, badge: &Badge)
        -> Result<bool, StorageError>;
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Stored value could not be decoded: {0}")]
    DeserializationError(String),
}
