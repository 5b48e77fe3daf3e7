use serde::{Deserialize, Serialize};

/// Teacher profile, keyed by the same uid as the matching `users` record.
/// Created together with it by admin provisioning; deleted by admin action.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeacherProfile {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub department: String,
    pub created_by: String,
    pub created_at: String,
}
