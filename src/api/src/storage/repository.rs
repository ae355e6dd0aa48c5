//! SQLite repository for CRUD operations on team data

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::schema::create_tables;
use crate::race_time::TimeKey;

/// Team member
#[derive(Debug, Clone, PartialEq)]
pub struct Athlete {
    pub id: i64,
    pub name: String,
    pub grade: i32,
    pub personal_record: Option<String>,
    pub events: Option<String>,
}

/// Scheduled competition
#[derive(Debug, Clone, PartialEq)]
pub struct Meet {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: Option<String>,
}

/// One athlete's finish at one meet
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub id: i64,
    pub athlete_id: i64,
    pub meet_id: i64,
    pub time: String,
    pub place: i32,
}

/// Meet result joined with the athlete it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct MeetResultRow {
    pub id: i64,
    pub time: String,
    pub place: i32,
    pub athlete_id: i64,
    pub athlete_name: String,
    pub athlete_grade: i32,
}

/// Leaderboard entry joined with athlete and meet
#[derive(Debug, Clone, PartialEq)]
pub struct TopTimeRow {
    pub id: i64,
    pub time: String,
    pub place: i32,
    pub athlete_id: i64,
    pub athlete_name: String,
    pub meet_id: i64,
    pub meet_name: String,
    pub meet_date: NaiveDate,
}

/// Mutable athlete fields
#[derive(Debug, Clone, PartialEq)]
pub struct AthleteParams {
    pub name: String,
    pub grade: i32,
    pub personal_record: Option<String>,
    pub events: Option<String>,
}

/// Mutable meet fields
#[derive(Debug, Clone, PartialEq)]
pub struct MeetParams {
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: Option<String>,
}

/// Mutable result fields
#[derive(Debug, Clone, PartialEq)]
pub struct ResultParams {
    pub athlete_id: i64,
    pub meet_id: i64,
    pub time: String,
    pub place: i32,
}

fn athlete_from_row(row: &Row<'_>) -> rusqlite::Result<Athlete> {
    Ok(Athlete {
        id: row.get(0)?,
        name: row.get(1)?,
        grade: row.get(2)?,
        personal_record: row.get(3)?,
        events: row.get(4)?,
    })
}

fn meet_from_row(row: &Row<'_>) -> rusqlite::Result<Meet> {
    Ok(Meet {
        id: row.get(0)?,
        name: row.get(1)?,
        date: row.get(2)?,
        location: row.get(3)?,
        description: row.get(4)?,
    })
}

fn result_from_row(row: &Row<'_>) -> rusqlite::Result<ResultRecord> {
    Ok(ResultRecord {
        id: row.get(0)?,
        athlete_id: row.get(1)?,
        meet_id: row.get(2)?,
        time: row.get(3)?,
        place: row.get(4)?,
    })
}

/// Repository for athletes, meets and results.
///
/// The connection sits behind a mutex so the repository can be shared
/// between request handlers.
pub struct TeamRepository {
    conn: Mutex<Connection>,
}

impl TeamRepository {
    /// Create a new repository, initializing the database if needed
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create database directory")?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        create_tables(&conn).context("Failed to create tables")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory repository (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("Failed to lock database connection: {}", e))
    }

    // ==================== Athletes ====================

    pub fn get_all_athletes(&self) -> Result<Vec<Athlete>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, grade, personal_record, events FROM athletes ORDER BY id",
        )?;

        let athletes = stmt
            .query_map([], athlete_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(athletes)
    }

    /// Get one athlete; `None` when the id does not exist
    pub fn get_athlete_by_id(&self, id: i64) -> Result<Option<Athlete>> {
        let athlete = self
            .conn()?
            .query_row(
                "SELECT id, name, grade, personal_record, events FROM athletes WHERE id = ?1",
                [id],
                athlete_from_row,
            )
            .optional()?;
        Ok(athlete)
    }

    /// Insert an athlete and return the generated id
    pub fn create_athlete(&self, athlete: &AthleteParams) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO athletes (name, grade, personal_record, events) VALUES (?1, ?2, ?3, ?4)",
            params![
                athlete.name,
                athlete.grade,
                athlete.personal_record,
                athlete.events,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Replace all mutable fields. Returns false when no row matched.
    pub fn update_athlete(&self, id: i64, athlete: &AthleteParams) -> Result<bool> {
        let changed = self.conn()?.execute(
            r#"
            UPDATE athletes
            SET name = ?1, grade = ?2, personal_record = ?3, events = ?4
            WHERE id = ?5
            "#,
            params![
                athlete.name,
                athlete.grade,
                athlete.personal_record,
                athlete.events,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Returns false when no row matched.
    pub fn delete_athlete(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM athletes WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    // ==================== Meets ====================

    pub fn get_all_meets(&self) -> Result<Vec<Meet>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, date, location, description FROM meets ORDER BY date, id",
        )?;

        let meets = stmt
            .query_map([], meet_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(meets)
    }

    pub fn get_meet_by_id(&self, id: i64) -> Result<Option<Meet>> {
        let meet = self
            .conn()?
            .query_row(
                "SELECT id, name, date, location, description FROM meets WHERE id = ?1",
                [id],
                meet_from_row,
            )
            .optional()?;
        Ok(meet)
    }

    pub fn create_meet(&self, meet: &MeetParams) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO meets (name, date, location, description) VALUES (?1, ?2, ?3, ?4)",
            params![meet.name, meet.date, meet.location, meet.description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_meet(&self, id: i64, meet: &MeetParams) -> Result<bool> {
        let changed = self.conn()?.execute(
            r#"
            UPDATE meets
            SET name = ?1, date = ?2, location = ?3, description = ?4
            WHERE id = ?5
            "#,
            params![meet.name, meet.date, meet.location, meet.description, id],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_meet(&self, id: i64) -> Result<bool> {
        let changed = self.conn()?.execute("DELETE FROM meets WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    // ==================== Results ====================

    pub fn get_all_results(&self) -> Result<Vec<ResultRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, athlete_id, meet_id, time, place FROM results ORDER BY id",
        )?;

        let results = stmt
            .query_map([], result_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    pub fn get_result_by_id(&self, id: i64) -> Result<Option<ResultRecord>> {
        let result = self
            .conn()?
            .query_row(
                "SELECT id, athlete_id, meet_id, time, place FROM results WHERE id = ?1",
                [id],
                result_from_row,
            )
            .optional()?;
        Ok(result)
    }

    pub fn create_result(&self, result: &ResultParams) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO results (athlete_id, meet_id, time, place) VALUES (?1, ?2, ?3, ?4)",
            params![result.athlete_id, result.meet_id, result.time, result.place],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_result(&self, id: i64, result: &ResultParams) -> Result<bool> {
        let changed = self.conn()?.execute(
            r#"
            UPDATE results
            SET athlete_id = ?1, meet_id = ?2, time = ?3, place = ?4
            WHERE id = ?5
            "#,
            params![
                result.athlete_id,
                result.meet_id,
                result.time,
                result.place,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_result(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM results WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    // ==================== Joined Views ====================

    /// Results for one meet with athlete name and grade, in finishing order
    pub fn get_meet_results(&self, meet_id: i64) -> Result<Vec<MeetResultRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.id, r.time, r.place, r.athlete_id, a.name, a.grade
            FROM results r
            JOIN athletes a ON a.id = r.athlete_id
            WHERE r.meet_id = ?1
            ORDER BY r.place, r.id
            "#,
        )?;

        let rows = stmt
            .query_map([meet_id], |row| {
                Ok(MeetResultRow {
                    id: row.get(0)?,
                    time: row.get(1)?,
                    place: row.get(2)?,
                    athlete_id: row.get(3)?,
                    athlete_name: row.get(4)?,
                    athlete_grade: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Fastest `limit` results across all meets.
    ///
    /// Times are compared as durations, see [`TimeKey`].
    pub fn get_top_times(&self, limit: usize) -> Result<Vec<TopTimeRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.id, r.time, r.place, r.athlete_id, a.name, r.meet_id, m.name, m.date
            FROM results r
            JOIN athletes a ON a.id = r.athlete_id
            JOIN meets m ON m.id = r.meet_id
            "#,
        )?;

        let mut rows = stmt
            .query_map([], |row| {
                Ok(TopTimeRow {
                    id: row.get(0)?,
                    time: row.get(1)?,
                    place: row.get(2)?,
                    athlete_id: row.get(3)?,
                    athlete_name: row.get(4)?,
                    meet_id: row.get(5)?,
                    meet_name: row.get(6)?,
                    meet_date: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.sort_by_cached_key(|r| (TimeKey::new(&r.time), r.id));
        rows.truncate(limit);

        Ok(rows)
    }

    // ==================== Counts ====================

    pub fn athlete_count(&self) -> Result<i64> {
        self.count("athletes")
    }

    pub fn meet_count(&self) -> Result<i64> {
        self.count("meets")
    }

    pub fn result_count(&self) -> Result<i64> {
        self.count("results")
    }

    // Table names are fixed by the callers above, never user input.
    fn count(&self, table: &str) -> Result<i64> {
        let count: i64 = self.conn()?.query_row(
            &format!("SELECT COUNT(*) FROM {}", table),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
