use std::collections::{BTreeSet, HashMap};

use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    middleware as axum_middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    appointments,
    consts::store_const::USER_TABLE,
    errors::Result,
    guard::{self, CurrentUser},
    messaging,
    models::{
        appointment::{Appointment, AppointmentStats, Decision},
        message::Message,
        user::UserRecord,
    },
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/appointments/{appointment_id}/decision", post(decide))
        .layer(axum_middleware::from_fn(move |req, next| {
            guard::require(state.clone(), guard::TEACHER_ONLY, req, next)
        }))
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherOverview {
    pub appointments: Vec<Appointment>,
    pub stats: AppointmentStats,
    pub messages: Vec<Message>,
    pub students: HashMap<String, StudentSummary>,
}

pub async fn overview(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<TeacherOverview>> {
    let appointments = appointments::list_for_teacher(&state.db, &user.uid).await?;
    let stats = AppointmentStats::tally(&appointments);
    let messages = messaging::list_for_receiver(&state.db, &user.uid).await?;

    // Display names for everyone who booked or wrote in.
    let mut student_ids: BTreeSet<String> = appointments
        .iter()
        .map(|appointment| appointment.student_id.clone())
        .collect();
    student_ids.extend(messages.iter().map(|message| message.sender_id.clone()));

    let mut students = HashMap::new();
    for student_id in student_ids {
        let record: Option<UserRecord> =
            state.db.select((USER_TABLE, student_id.as_str())).await?;
        if let Some(record) = record {
            students.insert(
                student_id,
                StudentSummary {
                    name: record.name,
                    email: record.email,
                },
            );
        }
    }

    Ok(Json(TeacherOverview {
        appointments,
        stats,
        messages,
        students,
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

pub async fn decide(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(appointment_id): Path<String>,
    Json(input): Json<DecisionRequest>,
) -> Result<Json<Appointment>> {
    let updated =
        appointments::transition(&state.db, &appointment_id, input.decision, &user.uid).await?;
    Ok(Json(updated))
}
