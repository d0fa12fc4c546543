//! Feedback API Endpoints
//! Mission: Accept public feedback submissions and serve scoped listings

use crate::auth::models::{Claims, Role};
use crate::configs::store::StoreError;
use crate::feedback::models::{FeedbackListQuery, FeedbackRecord, SubmitFeedbackRequest};
use crate::feedback::store::FeedbackFilter;
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// Submit feedback - POST /api/feedback
///
/// Public: students do not hold accounts. The submission routes to
/// subscribers by its branch once stored.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackRecord>), FeedbackApiError> {
    let errors = FieldErrors {
        config_title: required(
            blank_text(&payload.config_title),
            "Configuration title is required",
        ),
        branch: required(blank_text(&payload.branch), "Branch is required"),
        academic_year: required(
            blank_text(&payload.academic_year),
            "Academic Year is required",
        ),
        year: required(blank_number(payload.year), "Year is required"),
        semester: required(blank_number(payload.semester), "Semester is required"),
        section: required(blank_text(&payload.section), "Section is required"),
        ratings: required(payload.ratings.is_empty(), "Ratings are required"),
    };
    if errors.any() {
        return Err(FeedbackApiError::MissingFields(errors));
    }

    let record = FeedbackRecord {
        id: Uuid::new_v4(),
        // Titles are normalized upper-case across the system
        config_title: payload.config_title.unwrap_or_default().to_uppercase(),
        branch: payload.branch.unwrap_or_default(),
        academic_year: payload.academic_year.unwrap_or_default(),
        year: payload.year.unwrap_or_default(),
        semester: payload.semester.unwrap_or_default(),
        section: payload.section.unwrap_or_default(),
        ratings: payload.ratings,
        comments: payload.comments.filter(|c| !c.is_empty()),
        created_at: Utc::now(),
    };

    state.feedback.create(&record)?;
    state.notifier.feedback_submitted(&record.branch);

    info!(
        "📝 Feedback recorded for {} ({})",
        record.config_title, record.branch
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// List feedback - GET /api/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<FeedbackListQuery>,
) -> Result<Json<Vec<FeedbackRecord>>, FeedbackApiError> {
    let mut filter = FeedbackFilter {
        config_title: params.config_title.map(|t| t.to_uppercase()),
        year: params.year,
        semester: params.semester,
        academic_year: params.academic_year,
        ..Default::default()
    };

    // Same scoping as configuration listings
    if claims.role == Role::Coordinator {
        filter.branch = claims.branch.clone();
    } else if params.role.as_deref() == Some("bsh") || claims.role == Role::Bsh {
        filter.bsh_only = true;
    } else if let Some(branch) = params.branch {
        filter.branch = Some(branch);
    }

    let records = state.feedback.list(&filter)?;
    Ok(Json(records))
}

/// Per-field validation detail
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub config_title: Option<&'static str>,
    pub branch: Option<&'static str>,
    pub academic_year: Option<&'static str>,
    pub year: Option<&'static str>,
    pub semester: Option<&'static str>,
    pub section: Option<&'static str>,
    pub ratings: Option<&'static str>,
}

impl FieldErrors {
    fn any(&self) -> bool {
        self.config_title.is_some()
            || self.branch.is_some()
            || self.academic_year.is_some()
            || self.year.is_some()
            || self.semester.is_some()
            || self.section.is_some()
            || self.ratings.is_some()
    }
}

fn required(missing: bool, message: &'static str) -> Option<&'static str> {
    if missing {
        Some(message)
    } else {
        None
    }
}

fn blank_text(value: &Option<String>) -> bool {
    value.as_deref().unwrap_or("").is_empty()
}

fn blank_number(value: Option<i64>) -> bool {
    value.unwrap_or(0) == 0
}

/// Feedback API errors
#[derive(Debug)]
pub enum FeedbackApiError {
    MissingFields(FieldErrors),
    Storage(StoreError),
}

impl From<StoreError> for FeedbackApiError {
    fn from(err: StoreError) -> Self {
        FeedbackApiError::Storage(err)
    }
}

impl IntoResponse for FeedbackApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            FeedbackApiError::MissingFields(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing required fields", "details": details }),
            ),
            FeedbackApiError::Storage(err) => {
                tracing::error!("Storage error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
