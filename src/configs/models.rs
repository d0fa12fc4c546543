//! Configuration Models
//! Mission: Define configuration records and their wire formats

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Suffix tagging a branch as BSH-owned
pub const BSH_SUFFIX: &str = "-BSH";

/// A stored configuration record
///
/// Titles are upper-cased on write and unique across the collection.
/// Subject lists stay schema-free; the clients own their shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    pub id: Uuid,
    pub title: String,
    pub branch: String,
    pub academic_year: String,
    pub year: i64,
    pub semester: i64,
    pub section: String,
    pub theory_subjects: Vec<Value>,
    pub lab_subjects: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create request body
///
/// Required fields arrive optional so validation can name each missing
/// one instead of bouncing the body as malformed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfigRequest {
    pub title: Option<String>,
    pub branch: Option<String>,
    pub academic_year: Option<String>,
    pub year: Option<i64>,
    pub semester: Option<i64>,
    pub section: Option<String>,
    #[serde(default)]
    pub theory_subjects: Vec<Value>,
    #[serde(default)]
    pub lab_subjects: Vec<Value>,
}

/// Partial update request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    pub title: Option<String>,
    pub branch: Option<String>,
    pub academic_year: Option<String>,
    pub year: Option<i64>,
    pub semester: Option<i64>,
    pub section: Option<String>,
    pub theory_subjects: Option<Vec<Value>>,
    pub lab_subjects: Option<Vec<Value>>,
}

/// List query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigListQuery {
    pub branch: Option<String>,
    pub year: Option<i64>,
    pub semester: Option<i64>,
    pub academic_year: Option<String>,
    pub role: Option<String>,
}

/// True for branches carrying the BSH designation
pub fn is_bsh_branch(branch: &str) -> bool {
    branch == "BSH" || branch.ends_with(BSH_SUFFIX)
}

/// Tag a branch as BSH-owned unless already tagged
pub fn ensure_bsh_suffix(branch: &str) -> String {
    if branch.ends_with(BSH_SUFFIX) {
        branch.to_string()
    } else {
        format!("{}{}", branch, BSH_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bsh_suffix_tagging() {
        assert_eq!(ensure_bsh_suffix("CSE"), "CSE-BSH");
        assert_eq!(ensure_bsh_suffix("CSE-BSH"), "CSE-BSH");
    }

    #[test]
    fn test_bsh_branch_designation() {
        assert!(is_bsh_branch("BSH"));
        assert!(is_bsh_branch("CSE-BSH"));
        assert!(!is_bsh_branch("CSE"));
        assert!(!is_bsh_branch("BSHX"));
    }

    #[test]
    fn test_record_wire_format_is_camel_case() {
        let record = ConfigRecord {
            id: Uuid::new_v4(),
            title: "CSE-3-5-A".to_string(),
            branch: "CSE".to_string(),
            academic_year: "2024-25".to_string(),
            year: 3,
            semester: 5,
            section: "A".to_string(),
            theory_subjects: vec![],
            lab_subjects: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("academicYear").is_some());
        assert!(json.get("theorySubjects").is_some());
        assert!(json.get("academic_year").is_none());
    }

    #[test]
    fn test_create_request_defaults_subjects() {
        let req: CreateConfigRequest =
            serde_json::from_str(r#"{"title":"x","branch":"CSE"}"#).unwrap();
        assert!(req.theory_subjects.is_empty());
        assert!(req.lab_subjects.is_empty());
        assert!(req.year.is_none());
    }
}
