use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Approved => write!(f, "approved"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The two transitions a teacher can make on a pending appointment.
/// `approved` and `cancelled` are terminal; there is no way back.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Cancelled,
}

impl Decision {
    pub fn status(self) -> AppointmentStatus {
        match self {
            Decision::Approved => AppointmentStatus::Approved,
            Decision::Cancelled => AppointmentStatus::Cancelled,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Appointment {
    pub appointment_id: String,
    pub student_id: String,
    pub teacher_id: String,
    pub purpose: String,
    pub datetime: String,
    pub status: AppointmentStatus,
    pub created_at: String,
}

/// Pure fold over an appointment list; recomputed on every fetch, never
/// persisted.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppointmentStats {
    pub pending: usize,
    pub approved: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl AppointmentStats {
    pub fn tally(appointments: &[Appointment]) -> Self {
        appointments
            .iter()
            .fold(Self::default(), |mut stats, appointment| {
                match appointment.status {
                    AppointmentStatus::Pending => stats.pending += 1,
                    AppointmentStatus::Approved => stats.approved += 1,
                    AppointmentStatus::Cancelled => stats.cancelled += 1,
                }
                stats.total += 1;
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(status: AppointmentStatus) -> Appointment {
        Appointment {
            appointment_id: "a1".into(),
            student_id: "s1".into(),
            teacher_id: "t1".into(),
            purpose: "Help".into(),
            datetime: "2026-03-01T10:00:00.000Z".into(),
            status,
            created_at: "2026-02-20T08:00:00.000Z".into(),
        }
    }

    #[test]
    fn tally_counts_each_status_once() {
        let list = vec![
            appointment(AppointmentStatus::Pending),
            appointment(AppointmentStatus::Pending),
            appointment(AppointmentStatus::Approved),
            appointment(AppointmentStatus::Cancelled),
        ];

        let stats = AppointmentStats::tally(&list);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.total, 4);
    }

    #[test]
    fn statuses_always_sum_to_total() {
        let mut list = Vec::new();
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Approved,
            AppointmentStatus::Cancelled,
        ] {
            for _ in 0..5 {
                list.push(appointment(status));
                let stats = AppointmentStats::tally(&list);
                assert_eq!(stats.pending + stats.approved + stats.cancelled, stats.total);
            }
        }
        assert_eq!(AppointmentStats::tally(&[]).total, 0);
    }

    #[test]
    fn status_strings_match_the_stored_values() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&Decision::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(Decision::Approved.status(), AppointmentStatus::Approved);
        assert_eq!(Decision::Cancelled.status(), AppointmentStatus::Cancelled);
    }
}
