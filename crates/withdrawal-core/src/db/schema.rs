//! SQLite schema definition.

/// Complete database schema for the withdrawal tracker.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Medicine Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicine_standards (
    name TEXT PRIMARY KEY,                       -- case-sensitive lookup key
    withdrawal_days INTEGER NOT NULL CHECK (withdrawal_days >= 0),
    applicable_animals TEXT NOT NULL DEFAULT '[]', -- JSON array of lower-cased types
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Farms
-- ============================================================================

CREATE TABLE IF NOT EXISTS farms (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT,
    owner_name TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Animals
-- ============================================================================

CREATE TABLE IF NOT EXISTS animals (
    id TEXT PRIMARY KEY,
    tag TEXT NOT NULL UNIQUE,
    animal_type TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age >= 0),
    weight_kg REAL,
    farm_id TEXT NOT NULL REFERENCES farms(id),
    status TEXT NOT NULL DEFAULT 'SAFE' CHECK (status IN ('SAFE', 'UNSAFE')),
    status_updated_at TEXT,                      -- evaluation time of last status write
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_animals_farm ON animals(farm_id);
CREATE INDEX IF NOT EXISTS idx_animals_status ON animals(status);

-- ============================================================================
-- Medicine Usage Ledger (rows live until their withdrawal window is observed closed)
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicine_usages (
    id TEXT PRIMARY KEY,
    animal_id TEXT NOT NULL REFERENCES animals(id) ON DELETE CASCADE,
    medicine_name TEXT NOT NULL,
    administered_at TEXT NOT NULL,               -- RFC 3339, UTC
    withdrawal_amount INTEGER NOT NULL CHECK (withdrawal_amount >= 0),
    withdrawal_unit TEXT NOT NULL CHECK (withdrawal_unit IN ('days', 'minutes')),
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_usages_animal ON medicine_usages(animal_id);
"#;
