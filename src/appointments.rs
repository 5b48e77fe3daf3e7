//! Appointment lifecycle: students open requests, the owning teacher closes
//! them. `pending` is the only state that transitions; `approved` and
//! `cancelled` are terminal.

use serde::Deserialize;
use surrealdb::{Surreal, engine::any::Any};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    consts::store_const::APPOINTMENT_TABLE,
    errors::{Error, Result},
    messaging,
    models::appointment::{Appointment, AppointmentStatus, Decision},
    utils::time,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(length(min = 1, message = "teacher is required"))]
    pub teacher_id: String,
    #[validate(length(min = 1, message = "purpose is required"))]
    pub purpose: String,
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "time is required"))]
    pub time: String,
    pub message: Option<String>,
}

/// Creates a pending appointment for the student and, when the optional
/// message is non-empty, a correlated message to the teacher. The two writes
/// are independent; a message failure does not undo the appointment.
pub async fn book(
    db: &Surreal<Any>,
    student_id: &str,
    req: BookingRequest,
) -> Result<Appointment> {
    req.validate()?;
    let datetime = time::combine_instant(&req.date, &req.time)?;

    let appointment = Appointment {
        appointment_id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        teacher_id: req.teacher_id.clone(),
        purpose: req.purpose,
        datetime,
        status: AppointmentStatus::Pending,
        created_at: time::now_rfc3339(),
    };
    let _: Option<Appointment> = db
        .create((APPOINTMENT_TABLE, appointment.appointment_id.as_str()))
        .content(appointment.clone())
        .await?;

    audit::record(
        db.clone(),
        student_id,
        format!("Booked appointment with teacher {}", req.teacher_id),
    );

    if let Some(message) = req.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        messaging::send_message(
            db,
            student_id,
            &req.teacher_id,
            Some(appointment.appointment_id.clone()),
            message,
        )
        .await?;
    }

    Ok(appointment)
}

/// A student's own appointments, newest first.
pub async fn list_for_student(db: &Surreal<Any>, student_id: &str) -> Result<Vec<Appointment>> {
    let appointments: Vec<Appointment> = db
        .query(
            "SELECT * FROM type::table($table) WHERE student_id = $student \
             ORDER BY created_at DESC",
        )
        .bind(("table", APPOINTMENT_TABLE))
        .bind(("student", student_id.to_string()))
        .await?
        .take(0)?;
    Ok(appointments)
}

pub async fn list_for_teacher(db: &Surreal<Any>, teacher_id: &str) -> Result<Vec<Appointment>> {
    let appointments: Vec<Appointment> = db
        .query("SELECT * FROM type::table($table) WHERE teacher_id = $teacher")
        .bind(("table", APPOINTMENT_TABLE))
        .bind(("teacher", teacher_id.to_string()))
        .await?
        .take(0)?;
    Ok(appointments)
}

/// Moves a pending appointment to its terminal state. Only the teacher the
/// appointment was booked with may do this, and a closed appointment stays
/// exactly as it is.
pub async fn transition(
    db: &Surreal<Any>,
    appointment_id: &str,
    decision: Decision,
    acting_teacher_id: &str,
) -> Result<Appointment> {
    let appointment: Option<Appointment> =
        db.select((APPOINTMENT_TABLE, appointment_id)).await?;
    let appointment = appointment.ok_or(Error::AppointmentNotFound)?;

    if appointment.teacher_id != acting_teacher_id {
        return Err(Error::NotYourAppointment);
    }
    if appointment.status != AppointmentStatus::Pending {
        return Err(Error::AppointmentClosed);
    }

    let status = decision.status();
    let updated: Option<Appointment> = db
        .update((APPOINTMENT_TABLE, appointment_id))
        .merge(serde_json::json!({ "status": status }))
        .await?;
    let updated = updated.ok_or(Error::AppointmentNotFound)?;

    audit::record(
        db.clone(),
        acting_teacher_id,
        format!("Updated appointment {appointment_id} status to {status}"),
    );

    Ok(updated)
}
