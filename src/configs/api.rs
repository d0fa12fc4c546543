//! Configuration API Endpoints
//! Mission: Role-scoped CRUD over configuration records

use crate::auth::models::{Claims, Role};
use crate::configs::models::{
    ensure_bsh_suffix, ConfigListQuery, ConfigRecord, CreateConfigRequest, UpdateConfigRequest,
};
use crate::configs::store::{ConfigFilter, StoreError};
use crate::routes::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

/// Create a configuration - POST /api/config
pub async fn create_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateConfigRequest>,
) -> Result<(StatusCode, Json<ConfigRecord>), ConfigApiError> {
    let errors = FieldErrors {
        title: required(blank_text(&payload.title), "Title is required"),
        branch: required(blank_text(&payload.branch), "Branch is required"),
        academic_year: required(
            blank_text(&payload.academic_year),
            "Academic Year is required",
        ),
        year: required(blank_number(payload.year), "Year is required"),
        semester: required(blank_number(payload.semester), "Semester is required"),
        section: required(blank_text(&payload.section), "Section is required"),
    };
    if errors.any() {
        return Err(ConfigApiError::MissingFields(errors));
    }

    // Titles are stored upper-cased; uniqueness is case-insensitive
    let title = payload.title.unwrap_or_default().to_uppercase();
    if state.configs.title_taken(&title, None)? {
        return Err(ConfigApiError::DuplicateTitle);
    }

    // BSH authors always own "-BSH" tagged branches
    let mut branch = payload.branch.unwrap_or_default();
    if claims.role == Role::Bsh {
        branch = ensure_bsh_suffix(&branch);
    }

    let now = Utc::now();
    let record = ConfigRecord {
        id: Uuid::new_v4(),
        title,
        branch,
        academic_year: payload.academic_year.unwrap_or_default(),
        year: payload.year.unwrap_or_default(),
        semester: payload.semester.unwrap_or_default(),
        section: payload.section.unwrap_or_default(),
        theory_subjects: payload.theory_subjects,
        lab_subjects: payload.lab_subjects,
        created_at: now,
        updated_at: now,
    };

    state.configs.create(&record)?;
    state.notifier.config_changed(&record.branch);

    Ok((StatusCode::CREATED, Json(record)))
}

/// List configurations - GET /api/config
pub async fn list_configs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ConfigListQuery>,
) -> Result<Json<Vec<ConfigRecord>>, ConfigApiError> {
    let mut filter = ConfigFilter {
        year: params.year,
        semester: params.semester,
        academic_year: params.academic_year,
        ..Default::default()
    };

    // Coordinators are pinned to their own branch; the BSH view (by
    // query or caller identity) covers only "-BSH" tagged branches
    if claims.role == Role::Coordinator {
        filter.branch = claims.branch.clone();
    } else if params.role.as_deref() == Some("bsh") || claims.role == Role::Bsh {
        filter.bsh_only = true;
    } else if let Some(branch) = params.branch {
        filter.branch = Some(branch);
    }

    let records = state.configs.list(&filter)?;
    Ok(Json(records))
}

/// Fetch one configuration - GET /api/config/:title
pub async fn get_config_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<ConfigRecord>, ConfigApiError> {
    let record = state
        .configs
        .find_by_title(&title.to_uppercase())?
        .ok_or(ConfigApiError::NotFound)?;

    Ok(Json(record))
}

/// Update a configuration - PUT /api/config/:id
pub async fn update_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateConfigRequest>,
) -> Result<Json<UpdateConfigResponse>, ConfigApiError> {
    let mut record = state
        .configs
        .find_by_id(&id)?
        .ok_or(ConfigApiError::NotFound)?;

    // A changed title gets a fresh duplicate check, excluding this record
    if let Some(title) = payload.title.as_deref().filter(|t| !t.is_empty()) {
        if title != record.title {
            let normalized = title.to_uppercase();
            if state.configs.title_taken(&normalized, Some(&id))? {
                return Err(ConfigApiError::DuplicateTitle);
            }
        }
        record.title = title.to_uppercase();
    }

    if let Some(branch) = payload.branch {
        record.branch = if claims.role == Role::Bsh {
            ensure_bsh_suffix(&branch)
        } else {
            branch
        };
    }
    if let Some(academic_year) = payload.academic_year {
        record.academic_year = academic_year;
    }
    if let Some(year) = payload.year {
        record.year = year;
    }
    if let Some(semester) = payload.semester {
        record.semester = semester;
    }
    if let Some(section) = payload.section {
        record.section = section;
    }
    if let Some(theory_subjects) = payload.theory_subjects {
        record.theory_subjects = theory_subjects;
    }
    if let Some(lab_subjects) = payload.lab_subjects {
        record.lab_subjects = lab_subjects;
    }

    record.updated_at = Utc::now();
    state.configs.update(&record)?;
    state.notifier.config_changed(&record.branch);

    Ok(Json(UpdateConfigResponse {
        message: "Configuration updated successfully".to_string(),
        config: record,
    }))
}

/// Delete a configuration - DELETE /api/config/:id (admin only)
pub async fn delete_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteConfigResponse>, ConfigApiError> {
    // Role gate comes before the existence check
    if claims.role != Role::Admin {
        warn!(
            "❌ Delete rejected: {} ({})",
            claims.username,
            claims.role.as_str()
        );
        return Err(ConfigApiError::AdminOnly);
    }

    let record = state.configs.delete(&id)?;
    state.notifier.config_changed(&record.branch);

    info!("🗑️  Configuration deleted by {}: {}", claims.username, record.title);

    Ok(Json(DeleteConfigResponse {
        message: "Configuration deleted successfully".to_string(),
    }))
}

/// Update response body
#[derive(Debug, Serialize)]
pub struct UpdateConfigResponse {
    pub message: String,
    pub config: ConfigRecord,
}

/// Delete response body
#[derive(Debug, Serialize)]
pub struct DeleteConfigResponse {
    pub message: String,
}

/// Per-field validation detail; absent fields carry their message,
/// satisfied ones serialize as null
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub title: Option<&'static str>,
    pub branch: Option<&'static str>,
    pub academic_year: Option<&'static str>,
    pub year: Option<&'static str>,
    pub semester: Option<&'static str>,
    pub section: Option<&'static str>,
}

impl FieldErrors {
    fn any(&self) -> bool {
        self.title.is_some()
            || self.branch.is_some()
            || self.academic_year.is_some()
            || self.year.is_some()
            || self.semester.is_some()
            || self.section.is_some()
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

/// Configuration API errors
#[derive(Debug)]
pub enum ConfigApiError {
    MissingFields(FieldErrors),
    DuplicateTitle,
    NotFound,
    AdminOnly,
    Storage(StoreError),
}

impl From<StoreError> for ConfigApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ConfigApiError::NotFound,
            StoreError::DuplicateTitle => ConfigApiError::DuplicateTitle,
            other => ConfigApiError::Storage(other),
        }
    }
}

impl IntoResponse for ConfigApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ConfigApiError::MissingFields(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing required fields", "details": details }),
            ),
            ConfigApiError::DuplicateTitle => (
                StatusCode::CONFLICT,
                json!({ "error": "Configuration with this title already exists" }),
            ),
            ConfigApiError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Configuration not found" }),
            ),
            ConfigApiError::AdminOnly => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Only admin can delete configurations" }),
            ),
            ConfigApiError::Storage(err) => {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::store::ConfigStore;
    use crate::feedback::store::FeedbackStore;
    use crate::realtime::Notifier;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn test_state() -> (AppState, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let state = AppState {
            configs: Arc::new(ConfigStore::new(db_path).unwrap()),
            feedback: Arc::new(FeedbackStore::new(db_path).unwrap()),
            notifier: Notifier::new(16),
        };
        (state, temp_file)
    }

    fn claims_for(role: Role, branch: Option<&str>) -> Claims {
        Claims {
            username: "test".to_string(),
            role,
            branch: branch.map(|b| b.to_string()),
            exp: 4102444800,
        }
    }

    fn create_payload(title: &str, branch: &str) -> CreateConfigRequest {
        CreateConfigRequest {
            title: Some(title.to_string()),
            branch: Some(branch.to_string()),
            academic_year: Some("2024-25".to_string()),
            year: Some(3),
            semester: Some(5),
            section: Some("A".to_string()),
            theory_subjects: vec![],
            lab_subjects: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_title_and_bsh_branch() {
        let (state, _temp) = test_state();

        let (status, Json(record)) = create_config(
            State(state.clone()),
            Extension(claims_for(Role::Bsh, None)),
            Json(create_payload("maths Sec a", "CSE")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record.title, "MATHS SEC A");
        assert_eq!(record.branch, "CSE-BSH");
    }

    #[tokio::test]
    async fn test_create_reports_missing_fields() {
        let (state, _temp) = test_state();

        let payload = CreateConfigRequest {
            title: Some("CSE-3-5-A".to_string()),
            branch: None,
            academic_year: Some("2024-25".to_string()),
            year: None,
            semester: Some(5),
            section: Some("".to_string()),
            theory_subjects: vec![],
            lab_subjects: vec![],
        };

        let err = create_config(
            State(state),
            Extension(claims_for(Role::Admin, None)),
            Json(payload),
        )
        .await
        .err()
        .unwrap();

        match err {
            ConfigApiError::MissingFields(details) => {
                assert!(details.title.is_none());
                assert_eq!(details.branch, Some("Branch is required"));
                assert_eq!(details.year, Some("Year is required"));
                assert_eq!(details.section, Some("Section is required"));
                assert!(details.semester.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_title_is_case_insensitive() {
        let (state, _temp) = test_state();
        let admin = claims_for(Role::Admin, None);

        create_config(
            State(state.clone()),
            Extension(admin.clone()),
            Json(create_payload("Sec A", "CSE")),
        )
        .await
        .unwrap();

        let err = create_config(
            State(state),
            Extension(admin),
            Json(create_payload("sec a", "ECE")),
        )
        .await
        .err()
        .unwrap();

        assert!(matches!(err, ConfigApiError::DuplicateTitle));
    }

    #[tokio::test]
    async fn test_update_title_duplicate_excludes_self() {
        let (state, _temp) = test_state();
        let admin = claims_for(Role::Admin, None);

        let (_, Json(first)) = create_config(
            State(state.clone()),
            Extension(admin.clone()),
            Json(create_payload("SEC A", "CSE")),
        )
        .await
        .unwrap();

        create_config(
            State(state.clone()),
            Extension(admin.clone()),
            Json(create_payload("SEC B", "CSE")),
        )
        .await
        .unwrap();

        // Re-submitting its own title (different case) is not a conflict
        let update = UpdateConfigRequest {
            title: Some("sec a".to_string()),
            branch: None,
            academic_year: None,
            year: None,
            semester: None,
            section: Some("C".to_string()),
            theory_subjects: None,
            lab_subjects: None,
        };
        let Json(resp) = update_config(
            State(state.clone()),
            Extension(admin.clone()),
            Path(first.id),
            Json(update),
        )
        .await
        .unwrap();
        assert_eq!(resp.config.title, "SEC A");
        assert_eq!(resp.config.section, "C");
        assert!(resp.config.updated_at > first.updated_at);

        // Taking another record's title is a conflict
        let update = UpdateConfigRequest {
            title: Some("SEC B".to_string()),
            branch: None,
            academic_year: None,
            year: None,
            semester: None,
            section: None,
            theory_subjects: None,
            lab_subjects: None,
        };
        let err = update_config(
            State(state),
            Extension(admin),
            Path(first.id),
            Json(update),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ConfigApiError::DuplicateTitle));
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let (state, _temp) = test_state();

        let (_, Json(record)) = create_config(
            State(state.clone()),
            Extension(claims_for(Role::Admin, None)),
            Json(create_payload("SEC A", "CSE")),
        )
        .await
        .unwrap();

        let err = delete_config(
            State(state.clone()),
            Extension(claims_for(Role::Coordinator, Some("CSE"))),
            Path(record.id),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ConfigApiError::AdminOnly));

        // Record survives the rejected attempt
        assert!(state.configs.find_by_id(&record.id).unwrap().is_some());

        delete_config(
            State(state.clone()),
            Extension(claims_for(Role::Admin, None)),
            Path(record.id),
        )
        .await
        .unwrap();
        assert!(state.configs.find_by_id(&record.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_scoping() {
        let (state, _temp) = test_state();
        let admin = claims_for(Role::Admin, None);

        for (title, branch) in [("CSE-A", "CSE"), ("ECE-A", "ECE"), ("MATHS-A", "ECE-BSH")] {
            create_config(
                State(state.clone()),
                Extension(admin.clone()),
                Json(create_payload(title, branch)),
            )
            .await
            .unwrap();
        }

        // Coordinator sees own branch only, explicit params ignored
        let Json(records) = list_configs(
            State(state.clone()),
            Extension(claims_for(Role::Coordinator, Some("CSE"))),
            Query(ConfigListQuery {
                branch: Some("ECE".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].branch, "CSE");

        // BSH callers see tagged branches only
        let Json(records) = list_configs(
            State(state.clone()),
            Extension(claims_for(Role::Bsh, None)),
            Query(ConfigListQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].branch, "ECE-BSH");

        // Admins filter explicitly, or the bsh view via query param
        let Json(records) = list_configs(
            State(state.clone()),
            Extension(admin.clone()),
            Query(ConfigListQuery {
                role: Some("bsh".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(records.len(), 1);

        let Json(records) = list_configs(
            State(state),
            Extension(admin),
            Query(ConfigListQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(records.len(), 3);
    }
}
