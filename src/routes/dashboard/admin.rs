use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use serde::Serialize;

use crate::{
    consts::store_const::{TEACHER_TABLE, USER_TABLE},
    errors::Result,
    guard::{self, CurrentUser},
    models::{
        teacher::TeacherProfile,
        user::{Role, UserRecord},
    },
    provisioning::{self, NewStaffAccount, ProvisionedAccount},
    state::AppState,
    utils::{passgen, validated_form::ValidatedJson},
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/teachers", post(create_staff))
        .route("/teachers/{uid}", delete(remove_teacher))
        .route("/students/{uid}/approve", post(approve_student))
        .route("/password-suggestion", get(password_suggestion))
        .layer(axum_middleware::from_fn(move |req, next| {
            guard::require(state.clone(), guard::ADMIN_ONLY, req, next)
        }))
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub pending_students: Vec<UserRecord>,
    pub teachers: Vec<TeacherProfile>,
}

pub async fn overview(State(state): State<AppState>) -> Result<Json<AdminOverview>> {
    let pending_students: Vec<UserRecord> = state
        .db
        .query("SELECT * FROM type::table($table) WHERE role = $role AND approved = false")
        .bind(("table", USER_TABLE))
        .bind(("role", Role::Student))
        .await?
        .take(0)?;
    let teachers: Vec<TeacherProfile> = state.db.select(TEACHER_TABLE).await?;

    Ok(Json(AdminOverview {
        pending_students,
        teachers,
    }))
}

pub async fn create_staff(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<NewStaffAccount>,
) -> Result<(StatusCode, Json<ProvisionedAccount>)> {
    let account =
        provisioning::admin_create_account(&state.db, &state.identity, &user.uid, input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteTeacherResponse {
    pub msg: String,
}

pub async fn remove_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(uid): Path<String>,
) -> Result<Json<DeleteTeacherResponse>> {
    let removed = provisioning::delete_teacher(&state.db, &user.uid, &uid).await?;
    Ok(Json(DeleteTeacherResponse {
        msg: format!("Teacher {} deleted", removed.name),
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproveStudentResponse {
    pub msg: String,
}

pub async fn approve_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(uid): Path<String>,
) -> Result<Json<ApproveStudentResponse>> {
    provisioning::approve_student(&state.db, &user.uid, &uid).await?;
    Ok(Json(ApproveStudentResponse {
        msg: "Student approved successfully!".to_string(),
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordSuggestion {
    pub password: String,
}

/// Temporary password offered in the staff-creation form.
pub async fn password_suggestion() -> Json<PasswordSuggestion> {
    Json(PasswordSuggestion {
        password: passgen::temporary_password(),
    })
}
