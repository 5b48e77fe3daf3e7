use std::fmt;

use serde::{Deserialize, Serialize};

/// Access tier of an account. Stored as a lowercase string in the `users`
/// collection; anything outside these three values fails deserialization.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Teacher => write!(f, "teacher"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// One record per authenticated identity, keyed by its uid. The uid is also
/// stored as a plain field so query results deserialize without going through
/// the record id.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub approved: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// What the role-lookup endpoint and the route guard consume.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RoleInfo {
    pub role: Role,
    pub approved: bool,
    pub name: String,
}

impl From<UserRecord> for RoleInfo {
    fn from(user: UserRecord) -> Self {
        Self {
            role: user.role,
            approved: user.approved,
            name: user.name,
        }
    }
}
