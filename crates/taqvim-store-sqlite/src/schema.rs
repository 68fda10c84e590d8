//! SQL schema for the Taqvim SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS months (
    id      INTEGER PRIMARY KEY,
    name    TEXT NOT NULL UNIQUE,   -- Persian month name
    season  TEXT NOT NULL           -- Persian season name
);

CREATE TABLE IF NOT EXISTS days (
    id           INTEGER PRIMARY KEY,
    jalali_date  TEXT NOT NULL UNIQUE,   -- 'YYYY-MM-DD'
    day_name     TEXT NOT NULL,
    month_id     INTEGER NOT NULL REFERENCES months(id)
);

-- Written only together with their day; never updated or deleted.
CREATE TABLE IF NOT EXISTS slots (
    id      INTEGER PRIMARY KEY,
    day_id  INTEGER NOT NULL REFERENCES days(id),
    hour    INTEGER NOT NULL CHECK (hour BETWEEN 0 AND 23),
    UNIQUE (day_id, hour)
);

CREATE TABLE IF NOT EXISTS notes (
    id       INTEGER PRIMARY KEY,
    slot_id  INTEGER NOT NULL UNIQUE REFERENCES slots(id),
    text     TEXT
);

CREATE TABLE IF NOT EXISTS tags (
    id       INTEGER PRIMARY KEY,
    slot_id  INTEGER NOT NULL REFERENCES slots(id),
    name     TEXT NOT NULL,
    UNIQUE (slot_id, name)
);

CREATE INDEX IF NOT EXISTS days_month_idx    ON days(month_id);
CREATE INDEX IF NOT EXISTS days_day_name_idx ON days(day_name);
CREATE INDEX IF NOT EXISTS slots_hour_idx    ON slots(hour);

PRAGMA user_version = 1;
";
