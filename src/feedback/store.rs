//! Feedback Storage
//! Mission: Persist feedback submissions with SQLite

use crate::configs::store::StoreError;
use crate::feedback::models::FeedbackRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

/// Storage-level list filter, already role-resolved by the API layer
#[derive(Debug, Default)]
pub struct FeedbackFilter {
    pub branch: Option<String>,
    pub bsh_only: bool,
    pub config_title: Option<String>,
    pub year: Option<i64>,
    pub semester: Option<i64>,
    pub academic_year: Option<String>,
}

/// Feedback storage with SQLite backend
pub struct FeedbackStore {
    db_path: String,
}

impl FeedbackStore {
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
            "CREATE TABLE IF NOT EXISTS feedback (
                id TEXT PRIMARY KEY,
                config_title TEXT NOT NULL,
                branch TEXT NOT NULL,
                academic_year TEXT NOT NULL,
                year INTEGER NOT NULL,
                semester INTEGER NOT NULL,
                section TEXT NOT NULL,
                ratings TEXT NOT NULL,
                comments TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Insert a new submission
    pub fn create(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "INSERT INTO feedback (id, config_title, branch, academic_year, year, semester,
                 section, ratings, comments, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id.to_string(),
                record.config_title,
                record.branch,
                record.academic_year,
                record.year,
                record.semester,
                record.section,
                ratings_json(&record.ratings),
                record.comments,
                record.created_at.to_rfc3339(),
            ],
        )?;

        info!("📝 Stored feedback for {}", record.config_title);
        Ok(())
    }

    /// List submissions matching the filter, newest first
    pub fn list(&self, filter: &FeedbackFilter) -> Result<Vec<FeedbackRecord>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut sql = String::from(
            "SELECT id, config_title, branch, academic_year, year, semester, section,
                    ratings, comments, created_at
             FROM feedback",
        );
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(branch) = &filter.branch {
            clauses.push("branch = ?");
            values.push(Box::new(branch.clone()));
        }
        if filter.bsh_only {
            clauses.push("branch GLOB '*-BSH'");
        }
        if let Some(config_title) = &filter.config_title {
            clauses.push("config_title = ?");
            values.push(Box::new(config_title.clone()));
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
}

fn ratings_json(ratings: &Map<String, Value>) -> String {
    serde_json::to_string(ratings).unwrap_or_else(|_| "{}".to_string())
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<FeedbackRecord> {
    let id_str: String = row.get(0)?;
    let ratings_str: String = row.get(7)?;
    let created_str: String = row.get(9)?;

    Ok(FeedbackRecord {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        config_title: row.get(1)?,
        branch: row.get(2)?,
        academic_year: row.get(3)?,
        year: row.get(4)?,
        semester: row.get(5)?,
        section: row.get(6)?,
        ratings: serde_json::from_str(&ratings_str).unwrap_or_default(),
        comments: row.get(8)?,
        created_at: parse_timestamp(&created_str)?,
    })
}

fn parse_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (FeedbackStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = FeedbackStore::new(db_path).unwrap();
        (store, temp_file)
    }

    fn sample_record(config_title: &str, branch: &str, day: u32) -> FeedbackRecord {
        let mut ratings = Map::new();
        ratings.insert("Compilers".to_string(), json!({"overall": 4}));

        FeedbackRecord {
            id: Uuid::new_v4(),
            config_title: config_title.to_string(),
            branch: branch.to_string(),
            academic_year: "2024-25".to_string(),
            year: 3,
            semester: 5,
            section: "A".to_string(),
            ratings,
            comments: Some("good".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_create_and_list() {
        let (store, _temp) = create_test_store();
        store.create(&sample_record("CSE-A", "CSE", 1)).unwrap();
        store.create(&sample_record("CSE-A", "CSE", 3)).unwrap();
        store.create(&sample_record("MATHS-A", "CSE-BSH", 2)).unwrap();

        let all = store.list(&FeedbackFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].created_at.day(), 3);
        assert_eq!(all[2].created_at.day(), 1);
        assert_eq!(all[0].ratings["Compilers"]["overall"], 4);
    }

    #[test]
    fn test_list_filters() {
        let (store, _temp) = create_test_store();
        store.create(&sample_record("CSE-A", "CSE", 1)).unwrap();
        store.create(&sample_record("ECE-A", "ECE", 2)).unwrap();
        store.create(&sample_record("MATHS-A", "ECE-BSH", 3)).unwrap();

        let cse = store
            .list(&FeedbackFilter {
                branch: Some("CSE".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(cse.len(), 1);
        assert_eq!(cse[0].config_title, "CSE-A");

        let bsh = store
            .list(&FeedbackFilter {
                bsh_only: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(bsh.len(), 1);
        assert_eq!(bsh[0].branch, "ECE-BSH");

        let by_title = store
            .list(&FeedbackFilter {
                config_title: Some("ECE-A".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_title.len(), 1);
    }

    #[test]
    fn test_bsh_filter_is_case_sensitive() {
        let (store, _temp) = create_test_store();
        store.create(&sample_record("MATHS-A", "ECE-BSH", 1)).unwrap();
        store.create(&sample_record("MATHS-B", "ece-bsh", 2)).unwrap();

        let bsh = store
            .list(&FeedbackFilter {
                bsh_only: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(bsh.len(), 1);
        assert_eq!(bsh[0].branch, "ECE-BSH");
    }
}
