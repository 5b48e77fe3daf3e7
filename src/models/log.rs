use serde::{Deserialize, Serialize};

/// Append-only audit trail entry. Nothing in the application reads these
/// back; they exist for operational and forensic use.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogEntry {
    pub user_id: String,
    pub action: String,
    pub timestamp: String,
}
