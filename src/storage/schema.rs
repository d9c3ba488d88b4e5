//! Database schema definitions for TrailHunt.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Missions table
CREATE TABLE IF NOT EXISTS missions (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    category TEXT NOT NULL,
    location_name TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    estimated_distance_km REAL NOT NULL DEFAULT 0,
    difficulty TEXT NOT NULL DEFAULT 'easy',
    points INTEGER NOT NULL DEFAULT 10,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

-- Clues table
CREATE TABLE IF NOT EXISTS clues (
    id TEXT PRIMARY KEY,
    mission_id TEXT NOT NULL REFERENCES missions(id) ON DELETE CASCADE,
    clue_order INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    hint TEXT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    radius_m REAL NOT NULL DEFAULT 50,
    image_url TEXT,
    points INTEGER NOT NULL DEFAULT 5,
    required INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    UNIQUE(mission_id, clue_order)
);

CREATE INDEX IF NOT EXISTS idx_clues_mission_id ON clues(mission_id);

-- Clue progress ledger: one row per (hunter, clue), append-only
CREATE TABLE IF NOT EXISTS clue_progress (
    id TEXT PRIMARY KEY,
    hunter_id TEXT NOT NULL,
    mission_id TEXT NOT NULL REFERENCES missions(id) ON DELETE CASCADE,
    clue_id TEXT NOT NULL REFERENCES clues(id) ON DELETE CASCADE,
    reached_at TEXT NOT NULL,
    distance_m REAL NOT NULL,
    UNIQUE(hunter_id, clue_id)
);

CREATE INDEX IF NOT EXISTS idx_clue_progress_hunter_mission ON clue_progress(hunter_id, mission_id);

-- Mission completion markers: one row per (hunter, mission)
CREATE TABLE IF NOT EXISTS mission_completions (
    id TEXT PRIMARY KEY,
    hunter_id TEXT NOT NULL,
    mission_id TEXT NOT NULL REFERENCES missions(id) ON DELETE CASCADE,
    completed_at TEXT NOT NULL,
    UNIQUE(hunter_id, mission_id)
);

CREATE INDEX IF NOT EXISTS idx_mission_completions_hunter ON mission_completions(hunter_id);

-- Cumulative per-hunter statistics
CREATE TABLE IF NOT EXISTS hunter_stats (
    hunter_id TEXT PRIMARY KEY,
    total_missions INTEGER NOT NULL DEFAULT 0,
    total_distance_km REAL NOT NULL DEFAULT 0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_active_date TEXT,
    total_active_days INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

-- Badge definitions
CREATE TABLE IF NOT EXISTS badges (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    icon TEXT NOT NULL,
    requirement_type TEXT NOT NULL,
    requirement_value REAL NOT NULL,
    requirement_category TEXT
);

-- Earned badges: one row per (hunter, badge)
CREATE TABLE IF NOT EXISTS hunter_badges (
    id TEXT PRIMARY KEY,
    hunter_id TEXT NOT NULL,
    badge_id TEXT NOT NULL REFERENCES badges(id) ON DELETE CASCADE,
    unlocked_at TEXT NOT NULL,
    UNIQUE(hunter_id, badge_id)
);

CREATE INDEX IF NOT EXISTS idx_hunter_badges_hunter ON hunter_badges(hunter_id);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
