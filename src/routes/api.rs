use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::{
    errors::{Error, Result},
    models::user::RoleInfo,
    roles,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/role", get(get_user_role))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleQuery {
    pub uid: Option<String>,
}

/// Role-lookup read endpoint for out-of-process callers: access tier,
/// approval, and display name for a uid, or 404.
pub async fn get_user_role(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<RoleInfo>> {
    let uid = query.uid.ok_or(Error::MissingField("uid"))?;
    let info = roles::resolve_role(&state.db, &uid).await?;
    Ok(Json(info))
}
