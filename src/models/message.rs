use serde::{Deserialize, Serialize};

/// Free-text message between two participants, optionally correlated with an
/// appointment. `read` is stored but no operation flips it yet.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    pub content: String,
    pub created_at: String,
    pub read: bool,
}
