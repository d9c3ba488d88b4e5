//! Database operations using rusqlite.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use uuid::Uuid;

use crate::progression::types::{Badge, EarnedBadge, HunterStats, RequirementType};
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::storage::{HuntStore, StorageError};
use crate::tracking::types::{Clue, ClueProgress, Difficulty, Mission, MissionCategory};

/// SQLite-backed store.
///
/// The connection is shared by every server task, so it lives behind a
/// mutex; rusqlite connections are not Sync.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Self::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Self::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize the database schema.
    fn initialize(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;

        let current_version = Self::get_schema_version(conn)?;

        if current_version < CURRENT_VERSION {
            Self::migrate(conn, current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(conn: &Connection) -> Result<i32, StorageError> {
        let result: SqliteResult<i32> = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(StorageError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
        if from_version < 1 {
            conn.execute_batch(SCHEMA)
                .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;

            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                [CURRENT_VERSION],
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        // Future migrations would go here:
        // if from_version < 2 { ... }

        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

// ========== Row mapping helpers ==========

fn parse_uuid(s: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(s).map_err(|e| StorageError::DeserializationError(e.to_string()))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::DeserializationError(e.to_string()))
}

fn parse_date(s: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| StorageError::DeserializationError(e.to_string()))
}

struct MissionRow {
    id: String,
    title: String,
    description: Option<String>,
    category: String,
    location_name: String,
    latitude: f64,
    longitude: f64,
    estimated_distance_km: f64,
    difficulty: String,
    points: i64,
    is_active: bool,
    created_at: String,
}

impl MissionRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            location_name: row.get(4)?,
            latitude: row.get(5)?,
            longitude: row.get(6)?,
            estimated_distance_km: row.get(7)?,
            difficulty: row.get(8)?,
            points: row.get(9)?,
            is_active: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn into_mission(self) -> Result<Mission, StorageError> {
        Ok(Mission {
            id: parse_uuid(&self.id)?,
            title: self.title,
            description: self.description,
            category: MissionCategory::from_str(&self.category).ok_or_else(|| {
                StorageError::DeserializationError(format!(
                    "unknown mission category: {}",
                    self.category
                ))
            })?,
            location_name: self.location_name,
            latitude: self.latitude,
            longitude: self.longitude,
            estimated_distance_km: self.estimated_distance_km,
            difficulty: Difficulty::from_str(&self.difficulty).ok_or_else(|| {
                StorageError::DeserializationError(format!(
                    "unknown difficulty: {}",
                    self.difficulty
                ))
            })?,
            points: self.points,
            is_active: self.is_active,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

const MISSION_COLUMNS: &str = "id, title, description, category, location_name, latitude, \
     longitude, estimated_distance_km, difficulty, points, is_active, created_at";

struct ClueRow {
    id: String,
    mission_id: String,
    clue_order: i64,
    name: String,
    description: Option<String>,
    hint: Option<String>,
    latitude: f64,
    longitude: f64,
    radius_m: f64,
    image_url: Option<String>,
    points: i64,
    required: bool,
    created_at: String,
}

impl ClueRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            mission_id: row.get(1)?,
            clue_order: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            hint: row.get(5)?,
            latitude: row.get(6)?,
            longitude: row.get(7)?,
            radius_m: row.get(8)?,
            image_url: row.get(9)?,
            points: row.get(10)?,
            required: row.get(11)?,
            created_at: row.get(12)?,
        })
    }

    fn into_clue(self) -> Result<Clue, StorageError> {
        Ok(Clue {
            id: parse_uuid(&self.id)?,
            mission_id: parse_uuid(&self.mission_id)?,
            clue_order: self.clue_order,
            name: self.name,
            description: self.description,
            hint: self.hint,
            latitude: self.latitude,
            longitude: self.longitude,
            radius_m: self.radius_m,
            image_url: self.image_url,
            points: self.points,
            required: self.required,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

const CLUE_COLUMNS: &str = "id, mission_id, clue_order, name, description, hint, latitude, \
     longitude, radius_m, image_url, points, required, created_at";

fn badge_from_columns(
    id: String,
    name: String,
    description: String,
    icon: String,
    requirement_type: String,
    requirement_value: f64,
    requirement_category: Option<String>,
) -> Result<Badge, StorageError> {
    Ok(Badge {
        id,
        name,
        description,
        icon,
        requirement_type: RequirementType::from_str(&requirement_type).ok_or_else(|| {
            StorageError::DeserializationError(format!(
                "unknown requirement type: {}",
                requirement_type
            ))
        })?,
        requirement_value,
        requirement_category: requirement_category
            .map(|c| {
                MissionCategory::from_str(&c).ok_or_else(|| {
                    StorageError::DeserializationError(format!("unknown mission category: {}", c))
                })
            })
            .transpose()?,
    })
}

const BADGE_COLUMNS: &str =
    "id, name, description, icon, requirement_type, requirement_value, requirement_category";

fn read_stats(conn: &Connection, hunter_id: Uuid) -> Result<HunterStats, StorageError> {
    let result = conn.query_row(
        "SELECT total_missions, total_distance_km, current_streak, longest_streak, \
         last_active_date, total_active_days, updated_at FROM hunter_stats WHERE hunter_id = ?1",
        params![hunter_id.to_string()],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, String>(6)?,
            ))
        },
    );

    match result {
        Ok((
            total_missions,
            total_distance_km,
            current_streak,
            longest_streak,
            last_active_date,
            total_active_days,
            updated_at,
        )) => Ok(HunterStats {
            hunter_id,
            total_missions,
            total_distance_km,
            current_streak,
            longest_streak,
            last_active_date: last_active_date.map(|d| parse_date(&d)).transpose()?,
            total_active_days,
            updated_at: parse_timestamp(&updated_at)?,
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(HunterStats::new(hunter_id)),
        Err(e) => Err(StorageError::QueryFailed(e.to_string())),
    }
}

fn write_stats(conn: &Connection, stats: &HunterStats) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO hunter_stats (hunter_id, total_missions, total_distance_km, \
         current_streak, longest_streak, last_active_date, total_active_days, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            stats.hunter_id.to_string(),
            stats.total_missions,
            stats.total_distance_km,
            stats.current_streak,
            stats.longest_streak,
            stats.last_active_date.map(|d| d.format("%Y-%m-%d").to_string()),
            stats.total_active_days,
            stats.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

    Ok(())
}

impl HuntStore for Database {
    fn mission(&self, id: Uuid) -> Result<Option<Mission>, StorageError> {
        let conn = self.conn();
        let result = conn.query_row(
            &format!("SELECT {} FROM missions WHERE id = ?1", MISSION_COLUMNS),
            params![id.to_string()],
            MissionRow::from_row,
        );

        match result {
            Ok(row) => Ok(Some(row.into_mission()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::QueryFailed(e.to_string())),
        }
    }

    fn active_missions(&self) -> Result<Vec<Mission>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM missions WHERE is_active = 1 ORDER BY created_at DESC",
                MISSION_COLUMNS
            ))
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], MissionRow::from_row)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut missions = Vec::new();
        for row in rows {
            missions.push(
                row.map_err(|e| StorageError::QueryFailed(e.to_string()))?
                    .into_mission()?,
            );
        }

        Ok(missions)
    }

    fn insert_mission(&self, mission: &Mission) -> Result<(), StorageError> {
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO missions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    MISSION_COLUMNS
                ),
                params![
                    mission.id.to_string(),
                    mission.title,
                    mission.description,
                    mission.category.as_str(),
                    mission.location_name,
                    mission.latitude,
                    mission.longitude,
                    mission.estimated_distance_km,
                    mission.difficulty.as_str(),
                    mission.points,
                    mission.is_active,
                    mission.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn mission_clues(&self, mission_id: Uuid) -> Result<Vec<Clue>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM clues WHERE mission_id = ?1 ORDER BY clue_order ASC",
                CLUE_COLUMNS
            ))
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![mission_id.to_string()], ClueRow::from_row)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut clues = Vec::new();
        for row in rows {
            clues.push(
                row.map_err(|e| StorageError::QueryFailed(e.to_string()))?
                    .into_clue()?,
            );
        }

        Ok(clues)
    }

    fn insert_clue(&self, clue: &Clue) -> Result<(), StorageError> {
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO clues ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    CLUE_COLUMNS
                ),
                params![
                    clue.id.to_string(),
                    clue.mission_id.to_string(),
                    clue.clue_order,
                    clue.name,
                    clue.description,
                    clue.hint,
                    clue.latitude,
                    clue.longitude,
                    clue.radius_m,
                    clue.image_url,
                    clue.points,
                    clue.required,
                    clue.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn active_clues(&self) -> Result<Vec<(Clue, String)>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT c.id, c.mission_id, c.clue_order, c.name, c.description, c.hint, \
                 c.latitude, c.longitude, c.radius_m, c.image_url, c.points, c.required, \
                 c.created_at, m.title \
                 FROM clues c \
                 JOIN missions m ON m.id = c.mission_id \
                 WHERE m.is_active = 1 \
                 ORDER BY m.title, c.clue_order",
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let clue = ClueRow::from_row(row)?;
                let title: String = row.get(13)?;
                Ok((clue, title))
            })
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut clues = Vec::new();
        for row in rows {
            let (clue_row, title) = row.map_err(|e| StorageError::QueryFailed(e.to_string()))?;
            clues.push((clue_row.into_clue()?, title));
        }

        Ok(clues)
    }

    fn record_clue_if_absent(
        &self,
        hunter_id: Uuid,
        clue: &Clue,
        distance_m: f64,
    ) -> Result<bool, StorageError> {
        // The UNIQUE(hunter_id, clue_id) constraint makes this a single
        // atomic check-and-insert; concurrent signals cannot both win.
        let changed = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO clue_progress \
                 (id, hunter_id, mission_id, clue_id, reached_at, distance_m) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    Uuid::new_v4().to_string(),
                    hunter_id.to_string(),
                    clue.mission_id.to_string(),
                    clue.id.to_string(),
                    Utc::now().to_rfc3339(),
                    distance_m,
                ],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(changed > 0)
    }

    fn completed_clue_ids(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<HashSet<Uuid>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT clue_id FROM clue_progress WHERE hunter_id = ?1 AND mission_id = ?2")
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![hunter_id.to_string(), mission_id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut ids = HashSet::new();
        for row in rows {
            let id = row.map_err(|e| StorageError::QueryFailed(e.to_string()))?;
            ids.insert(parse_uuid(&id)?);
        }

        Ok(ids)
    }

    fn clue_progress(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<Vec<ClueProgress>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, hunter_id, mission_id, clue_id, reached_at, distance_m \
                 FROM clue_progress WHERE hunter_id = ?1 AND mission_id = ?2 \
                 ORDER BY reached_at ASC",
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![hunter_id.to_string(), mission_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, f64>(5)?,
                    ))
                },
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, hunter, mission, clue, reached_at, distance_m) =
                row.map_err(|e| StorageError::QueryFailed(e.to_string()))?;

            entries.push(ClueProgress {
                id: parse_uuid(&id)?,
                hunter_id: parse_uuid(&hunter)?,
                mission_id: parse_uuid(&mission)?,
                clue_id: parse_uuid(&clue)?,
                reached_at: parse_timestamp(&reached_at)?,
                distance_m,
            });
        }

        Ok(entries)
    }

    fn clear_progress(&self, hunter_id: Uuid, mission_id: Uuid) -> Result<usize, StorageError> {
        self.conn()
            .execute(
                "DELETE FROM clue_progress WHERE hunter_id = ?1 AND mission_id = ?2",
                params![hunter_id.to_string(), mission_id.to_string()],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))
    }

    fn record_completion_if_absent(
        &self,
        hunter_id: Uuid,
        mission_id: Uuid,
    ) -> Result<bool, StorageError> {
        let changed = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO mission_completions \
                 (id, hunter_id, mission_id, completed_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    hunter_id.to_string(),
                    mission_id.to_string(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(changed > 0)
    }

    fn clear_completion(&self, hunter_id: Uuid, mission_id: Uuid) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "DELETE FROM mission_completions WHERE hunter_id = ?1 AND mission_id = ?2",
                params![hunter_id.to_string(), mission_id.to_string()],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn category_completions(
        &self,
        hunter_id: Uuid,
        category: MissionCategory,
    ) -> Result<i64, StorageError> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM mission_completions mc \
                 JOIN missions m ON m.id = mc.mission_id \
                 WHERE mc.hunter_id = ?1 AND m.category = ?2",
                params![hunter_id.to_string(), category.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))
    }

    fn category_breakdown(
        &self,
        hunter_id: Uuid,
    ) -> Result<Vec<(MissionCategory, i64)>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT m.category, COUNT(*) FROM mission_completions mc \
                 JOIN missions m ON m.id = mc.mission_id \
                 WHERE mc.hunter_id = ?1 GROUP BY m.category ORDER BY m.category",
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![hunter_id.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut breakdown = Vec::new();
        for row in rows {
            let (category, count) = row.map_err(|e| StorageError::QueryFailed(e.to_string()))?;
            let category = MissionCategory::from_str(&category).ok_or_else(|| {
                StorageError::DeserializationError(format!("unknown mission category: {}", category))
            })?;
            breakdown.push((category, count));
        }

        Ok(breakdown)
    }

    fn hunter_stats(&self, hunter_id: Uuid) -> Result<HunterStats, StorageError> {
        read_stats(&self.conn(), hunter_id)
    }

    fn update_hunter_stats(
        &self,
        hunter_id: Uuid,
        apply: &mut dyn FnMut(&mut HunterStats),
    ) -> Result<HunterStats, StorageError> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::TransactionFailed(e.to_string()))?;

        let mut stats = read_stats(&tx, hunter_id)?;
        apply(&mut stats);
        stats.updated_at = Utc::now();
        write_stats(&tx, &stats)?;

        tx.commit()
            .map_err(|e| StorageError::TransactionFailed(e.to_string()))?;

        Ok(stats)
    }

    fn all_badges(&self) -> Result<Vec<Badge>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM badges", BADGE_COLUMNS))
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            })
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut badges = Vec::new();
        for row in rows {
            let (id, name, description, icon, kind, value, category) =
                row.map_err(|e| StorageError::QueryFailed(e.to_string()))?;
            badges.push(badge_from_columns(
                id,
                name,
                description,
                icon,
                kind,
                value,
                category,
            )?);
        }

        Ok(badges)
    }

    fn seed_badges(&self, badges: &[Badge]) -> Result<(), StorageError> {
        let conn = self.conn();

        for badge in badges {
            conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO badges ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    BADGE_COLUMNS
                ),
                params![
                    badge.id,
                    badge.name,
                    badge.description,
                    badge.icon,
                    badge.requirement_type.as_str(),
                    badge.requirement_value,
                    badge.requirement_category.map(|c| c.as_str()),
                ],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        }

        Ok(())
    }

    fn earned_badge_ids(&self, hunter_id: Uuid) -> Result<HashSet<String>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT badge_id FROM hunter_badges WHERE hunter_id = ?1")
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![hunter_id.to_string()], |row| {
                row.get::<_, String>(0)
            })
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row.map_err(|e| StorageError::QueryFailed(e.to_string()))?);
        }

        Ok(ids)
    }

    fn earned_badges(&self, hunter_id: Uuid) -> Result<Vec<EarnedBadge>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT b.id, b.name, b.description, b.icon, b.requirement_type, \
                 b.requirement_value, b.requirement_category, hb.unlocked_at \
                 FROM badges b \
                 JOIN hunter_badges hb ON b.id = hb.badge_id \
                 WHERE hb.hunter_id = ?1 \
                 ORDER BY hb.unlocked_at DESC",
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![hunter_id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let mut earned = Vec::new();
        for row in rows {
            let (id, name, description, icon, kind, value, category, unlocked_at) =
                row.map_err(|e| StorageError::QueryFailed(e.to_string()))?;

            earned.push(EarnedBadge {
                badge: badge_from_columns(id, name, description, icon, kind, value, category)?,
                unlocked_at: parse_timestamp(&unlocked_at)?,
            });
        }

        Ok(earned)
    }

    fn award_badge_if_absent(
        &self,
        hunter_id: Uuid,
        badge: &Badge,
    ) -> Result<bool, StorageError> {
        let changed = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO hunter_badges (id, hunter_id, badge_id, unlocked_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    hunter_id.to_string(),
                    badge.id,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(changed > 0)
    }
}
