//! Feedback Models
//! Mission: Define feedback submissions and their wire formats

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A stored feedback submission
///
/// Ratings stay schema-free; each key names a subject and its value
/// carries whatever score payload the submitting form produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub config_title: String,
    pub branch: String,
    pub academic_year: String,
    pub year: i64,
    pub semester: i64,
    pub section: String,
    pub ratings: Map<String, Value>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Submit request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    pub config_title: Option<String>,
    pub branch: Option<String>,
    pub academic_year: Option<String>,
    pub year: Option<i64>,
    pub semester: Option<i64>,
    pub section: Option<String>,
    #[serde(default)]
    pub ratings: Map<String, Value>,
    pub comments: Option<String>,
}

/// List query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackListQuery {
    pub branch: Option<String>,
    pub config_title: Option<String>,
    pub year: Option<i64>,
    pub semester: Option<i64>,
    pub academic_year: Option<String>,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_wire_format_is_camel_case() {
        let mut ratings = Map::new();
        ratings.insert("Compilers".to_string(), json!({"overall": 4}));

        let record = FeedbackRecord {
            id: Uuid::new_v4(),
            config_title: "CSE-3-5-A".to_string(),
            branch: "CSE".to_string(),
            academic_year: "2024-25".to_string(),
            year: 3,
            semester: 5,
            section: "A".to_string(),
            ratings,
            comments: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("configTitle").is_some());
        assert_eq!(json["ratings"]["Compilers"]["overall"], 4);
        assert_eq!(json["comments"], Value::Null);
    }

    #[test]
    fn test_submit_request_defaults_ratings() {
        let req: SubmitFeedbackRequest =
            serde_json::from_str(r#"{"configTitle":"CSE-3-5-A"}"#).unwrap();
        assert!(req.ratings.is_empty());
        assert!(req.branch.is_none());
    }
}
