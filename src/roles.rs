use surrealdb::{Surreal, engine::any::Any};

use crate::{
    consts::store_const::USER_TABLE,
    errors::{Error, Result},
    models::user::{RoleInfo, UserRecord},
};

/// Maps a uid to its role, approval flag, and display name. Pure read with
/// no caching: role and approval can change between checks (an admin
/// approval can arrive at any time), so every protected request resolves
/// afresh.
pub async fn resolve_role(db: &Surreal<Any>, uid: &str) -> Result<RoleInfo> {
    let user: Option<UserRecord> = db.select((USER_TABLE, uid)).await?;
    user.map(RoleInfo::from).ok_or(Error::UserNotFound)
}
