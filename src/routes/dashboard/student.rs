use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    appointments::{self, BookingRequest},
    consts::store_const::TEACHER_TABLE,
    errors::Result,
    guard::{self, CurrentUser},
    messaging,
    models::{
        appointment::{Appointment, AppointmentStats},
        teacher::TeacherProfile,
    },
    state::AppState,
    utils::validated_form::ValidatedJson,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/appointments", post(book))
        .route("/messages", post(send_message))
        .layer(axum_middleware::from_fn(move |req, next| {
            guard::require(state.clone(), guard::STUDENT_ONLY, req, next)
        }))
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentOverview {
    pub teachers: Vec<TeacherProfile>,
    pub appointments: Vec<Appointment>,
    pub stats: AppointmentStats,
}

pub async fn overview(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<StudentOverview>> {
    let teachers: Vec<TeacherProfile> = state.db.select(TEACHER_TABLE).await?;
    let appointments = appointments::list_for_student(&state.db, &user.uid).await?;
    let stats = AppointmentStats::tally(&appointments);

    Ok(Json(StudentOverview {
        teachers,
        appointments,
        stats,
    }))
}

pub async fn book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<BookingRequest>,
) -> Result<(StatusCode, Json<Appointment>)> {
    let appointment = appointments::book(&state.db, &user.uid, input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "receiver is required"))]
    pub receiver_id: String,
    pub appointment_id: Option<String>,
    #[validate(length(min = 1, message = "message content is required"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub msg: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>)> {
    messaging::send_message(
        &state.db,
        &user.uid,
        &input.receiver_id,
        input.appointment_id,
        &input.content,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            msg: "Message sent successfully".to_string(),
        }),
    ))
}
