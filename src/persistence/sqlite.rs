use super::{EntryStore, StorageError, StorageResult};
use crate::entry::{
    DATE_FORMAT, HexColor, ScheduleEntry, ScheduleEntryInput, Session, TIMESTAMP_FORMAT,
};
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SELECT_COLUMNS: &str = "SELECT id, course_name, course_code, teacher, lesson, notes, \
     study_date, session, color, created_at FROM schedules";

enum Location {
    File(PathBuf),
    Memory(Mutex<Connection>),
}

/// SQLite-backed entry storage.
///
/// A file-backed store opens a fresh connection for every operation and
/// drops it on return. The in-memory store keeps one connection alive for its
/// whole lifetime.
pub struct SqliteStorage {
    location: Location,
}

impl SqliteStorage {
    /// Opens (or creates) the database file, creating missing parent
    /// directories first.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let storage = Self {
            location: Location::File(path.to_path_buf()),
        };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;
        let storage = Self {
            location: Location::Memory(Mutex::new(connection)),
        };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory(_) => None,
        }
    }

    fn with_connection<T, F>(&self, op: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        match &self.location {
            Location::File(path) => {
                let connection = Connection::open(path)?;
                op(&connection)
            }
            Location::Memory(connection) => {
                let guard = connection.lock();
                op(&guard)
            }
        }
    }

    fn initialize_schema(connection: &Connection) -> StorageResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS schedules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_name TEXT NOT NULL,
                course_code TEXT NOT NULL,
                teacher TEXT NOT NULL,
                lesson TEXT,
                notes TEXT,
                study_date TEXT NOT NULL,
                session TEXT NOT NULL,
                color TEXT DEFAULT '#4CAF50',
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl EntryStore for SqliteStorage {
    fn initialize(&self) -> StorageResult<()> {
        debug!(path = ?self.path(), "ensuring schedules table exists");
        self.with_connection(Self::initialize_schema)
    }

    fn insert(&self, input: &ScheduleEntryInput) -> StorageResult<i64> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO schedules \
                 (course_name, course_code, teacher, lesson, notes, study_date, session, color) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    input.course_name,
                    input.course_code,
                    input.teacher,
                    input.lesson,
                    input.notes,
                    input.study_date.format(DATE_FORMAT).to_string(),
                    input.session.as_str(),
                    input.color.as_str(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn fetch_all(&self) -> StorageResult<Vec<ScheduleEntry>> {
        self.with_connection(|conn| {
            let sql = format!(
                "{SELECT_COLUMNS} ORDER BY study_date ASC, \
                 CASE session WHEN 'Morning' THEN 0 WHEN 'Afternoon' THEN 1 \
                 WHEN 'Evening' THEN 2 ELSE 3 END ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], StoredRow::from_row)?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?.into_entry()?);
            }
            Ok(entries)
        })
    }

    fn fetch(&self, id: i64) -> StorageResult<Option<ScheduleEntry>> {
        self.with_connection(|conn| {
            let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
            let row = conn
                .query_row(&sql, params![id], StoredRow::from_row)
                .optional()?;
            row.map(StoredRow::into_entry).transpose()
        })
    }

    fn update(&self, id: i64, input: &ScheduleEntryInput) -> StorageResult<bool> {
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE schedules \
                 SET course_name = ?1, course_code = ?2, teacher = ?3, lesson = ?4, notes = ?5, \
                     study_date = ?6, session = ?7, color = ?8 \
                 WHERE id = ?9",
                params![
                    input.course_name,
                    input.course_code,
                    input.teacher,
                    input.lesson,
                    input.notes,
                    input.study_date.format(DATE_FORMAT).to_string(),
                    input.session.as_str(),
                    input.color.as_str(),
                    id,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete(&self, id: i64) -> StorageResult<bool> {
        self.with_connection(|conn| {
            let changed = conn.execute("DELETE FROM schedules WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
    }
}

/// Column values as SQLite returns them, before domain parsing.
struct StoredRow {
    id: i64,
    course_name: String,
    course_code: String,
    teacher: String,
    lesson: Option<String>,
    notes: Option<String>,
    study_date: String,
    session: String,
    color: Option<String>,
    created_at: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            course_name: row.get(1)?,
            course_code: row.get(2)?,
            teacher: row.get(3)?,
            lesson: row.get(4)?,
            notes: row.get(5)?,
            study_date: row.get(6)?,
            session: row.get(7)?,
            color: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn into_entry(self) -> StorageResult<ScheduleEntry> {
        let id = self.id;
        let invalid = |what: &str, err: String| {
            StorageError::InvalidData(format!("schedule {id} has invalid {what}: {err}"))
        };

        let study_date = NaiveDate::parse_from_str(&self.study_date, DATE_FORMAT)
            .map_err(|e| invalid("study_date", e.to_string()))?;
        let session = self
            .session
            .parse::<Session>()
            .map_err(|e| invalid("session", e.to_string()))?;
        let color = HexColor::parse_or_default(self.color.as_deref())
            .map_err(|e| invalid("color", e.to_string()))?;
        let created_at = NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
            .map_err(|e| invalid("created_at", e.to_string()))?;

        Ok(ScheduleEntry {
            id,
            course_name: self.course_name,
            course_code: self.course_code,
            teacher: self.teacher,
            lesson: self.lesson,
            notes: self.notes,
            study_date,
            session,
            color,
            created_at,
        })
    }
}
