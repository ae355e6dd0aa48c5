//! SQLite schema definitions for team data
//!
//! Tables:
//! - athletes: Team roster
//! - meets: Scheduled competitions
//! - results: One athlete's finish at one meet

use rusqlite::{Connection, Result};

/// Create all tables in the database
///
/// Also switches foreign-key enforcement off for this connection; the
/// bundled SQLite turns it on by default, and results may reference
/// athletes or meets that no longer exist.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", false)?;

    // Team roster
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS athletes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            grade INTEGER NOT NULL,
            personal_record TEXT,
            events TEXT
        )
        "#,
        [],
    )?;

    // Competitions, date stored as YYYY-MM-DD
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS meets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            date TEXT NOT NULL,
            location TEXT NOT NULL,
            description TEXT
        )
        "#,
        [],
    )?;

    // Finishes. References are declared but not enforced.
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            athlete_id INTEGER NOT NULL REFERENCES athletes(id),
            meet_id INTEGER NOT NULL REFERENCES meets(id),
            time TEXT NOT NULL,
            place INTEGER NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_results_meet ON results(meet_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_results_athlete ON results(athlete_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_meets_date ON meets(date)",
        [],
    )?;

    Ok(())
}
