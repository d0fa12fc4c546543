//! Configuration Storage
//! Mission: Persist configuration records with SQLite

use crate::configs::models::ConfigRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

/// Storage errors surfaced to the API layer
#[derive(Debug)]
pub enum StoreError {
    NotFound,
    DuplicateTitle,
    Db(rusqlite::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Record not found"),
            StoreError::DuplicateTitle => write!(f, "Title already exists"),
            StoreError::Db(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        // The unique title index is the only constraint reachable from
        // validated inputs
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                return StoreError::DuplicateTitle;
            }
        }
        StoreError::Db(err)
    }
}

/// Storage-level list filter, already role-resolved by the API layer
#[derive(Debug, Default)]
pub struct ConfigFilter {
    pub branch: Option<String>,
    pub bsh_only: bool,
    pub year: Option<i64>,
    pub semester: Option<i64>,
    pub academic_year: Option<String>,
}

/// Configuration storage with SQLite backend
pub struct ConfigStore {
    db_path: String,
}

impl ConfigStore {
    /// Create a new store and initialize the schema
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS configurations (
                id TEXT PRIMARY KEY,
                title TEXT UNIQUE NOT NULL,
                branch TEXT NOT NULL,
                academic_year TEXT NOT NULL,
                year INTEGER NOT NULL,
                semester INTEGER NOT NULL,
                section TEXT NOT NULL,
                theory_subjects TEXT NOT NULL,
                lab_subjects TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Insert a new record; the title must already be normalized
    pub fn create(&self, record: &ConfigRecord) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "INSERT INTO configurations (id, title, branch, academic_year, year, semester,
                 section, theory_subjects, lab_subjects, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id.to_string(),
                record.title,
                record.branch,
                record.academic_year,
                record.year,
                record.semester,
                record.section,
                subjects_json(&record.theory_subjects),
                subjects_json(&record.lab_subjects),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;

        info!("✅ Created configuration: {}", record.title);
        Ok(())
    }

    /// Fetch one record by its (normalized) title
    pub fn find_by_title(&self, title: &str) -> Result<Option<ConfigRecord>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, title, branch, academic_year, year, semester, section,
                    theory_subjects, lab_subjects, created_at, updated_at
             FROM configurations WHERE title = ?1",
        )?;

        match stmt.query_row(params![title], row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch one record by id
    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<ConfigRecord>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, title, branch, academic_year, year, semester, section,
                    theory_subjects, lab_subjects, created_at, updated_at
             FROM configurations WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether a title is in use, optionally excluding one record
    pub fn title_taken(&self, title: &str, exclude: Option<&Uuid>) -> Result<bool, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let count: i64 = match exclude {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM configurations WHERE title = ?1 AND id != ?2",
                params![title, id.to_string()],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM configurations WHERE title = ?1",
                params![title],
                |row| row.get(0),
            )?,
        };

        Ok(count > 0)
    }

    /// List records matching the filter, newest first
    pub fn list(&self, filter: &ConfigFilter) -> Result<Vec<ConfigRecord>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut sql = String::from(
            "SELECT id, title, branch, academic_year, year, semester, section,
                    theory_subjects, lab_subjects, created_at, updated_at
             FROM configurations",
        );
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(branch) = &filter.branch {
            clauses.push("branch = ?");
            values.push(Box::new(branch.clone()));
        }
        if filter.bsh_only {
            // The designation suffix is case sensitive; SQLite LIKE is not
            clauses.push("branch GLOB '*-BSH'");
        }
        if let Some(year) = filter.year {
            clauses.push("year = ?");
            values.push(Box::new(year));
        }
        if let Some(semester) = filter.semester {
            clauses.push("semester = ?");
            values.push(Box::new(semester));
        }
        if let Some(academic_year) = &filter.academic_year {
            clauses.push("academic_year = ?");
            values.push(Box::new(academic_year.clone()));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|b| b.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_refs.as_slice(), row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Rewrite an existing record in full
    pub fn update(&self, record: &ConfigRecord) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute(
            "UPDATE configurations
             SET title = ?2, branch = ?3, academic_year = ?4, year = ?5, semester = ?6,
                 section = ?7, theory_subjects = ?8, lab_subjects = ?9, updated_at = ?10
             WHERE id = ?1",
            params![
                record.id.to_string(),
                record.title,
                record.branch,
                record.academic_year,
                record.year,
                record.semester,
                record.section,
                subjects_json(&record.theory_subjects),
                subjects_json(&record.lab_subjects),
                record.updated_at.to_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound);
        }

        info!("✅ Updated configuration: {}", record.title);
        Ok(())
    }

    /// Delete by id, returning the removed record
    pub fn delete(&self, id: &Uuid) -> Result<ConfigRecord, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        // Read and delete in one statement; of two racing deletes only one
        // gets the row back
        match conn.query_row(
            "DELETE FROM configurations WHERE id = ?1
             RETURNING id, title, branch, academic_year, year, semester, section,
                       theory_subjects, lab_subjects, created_at, updated_at",
            params![id.to_string()],
            row_to_record,
        ) {
            Ok(record) => {
                info!("🗑️  Deleted configuration: {}", record.title);
                Ok(record)
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

fn subjects_json(subjects: &[Value]) -> String {
    serde_json::to_string(subjects).unwrap_or_else(|_| "[]".to_string())
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ConfigRecord> {
    let id_str: String = row.get(0)?;
    let theory_json: String = row.get(7)?;
    let lab_json: String = row.get(8)?;
    let created_str: String = row.get(9)?;
    let updated_str: String = row.get(10)?;

    Ok(ConfigRecord {
        id: Uuid::parse_str(&id_str).map_err(|e| text_conversion_error(0, e))?,
        title: row.get(1)?,
        branch: row.get(2)?,
        academic_year: row.get(3)?,
        year: row.get(4)?,
        semester: row.get(5)?,
        section: row.get(6)?,
        theory_subjects: serde_json::from_str(&theory_json).unwrap_or_default(),
        lab_subjects: serde_json::from_str(&lab_json).unwrap_or_default(),
        created_at: parse_timestamp(9, &created_str)?,
        updated_at: parse_timestamp(10, &updated_str)?,
    })
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| text_conversion_error(idx, e))
}

fn text_conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}
