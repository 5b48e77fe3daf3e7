use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::{
    errors::Result,
    identity::AuthContext,
    provisioning::{self, SetupRequest},
    state::AppState,
    utils::validated_form::ValidatedJson,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(status).post(create_admin))
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupStatus {
    pub setup_complete: bool,
}

pub async fn status(State(state): State<AppState>) -> Result<Json<SetupStatus>> {
    Ok(Json(SetupStatus {
        setup_complete: provisioning::admin_exists(&state.db).await?,
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupResponse {
    pub msg: String,
    pub uid: String,
}

pub async fn create_admin(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SetupRequest>,
) -> Result<(StatusCode, Json<SetupResponse>)> {
    let ctx = AuthContext::new(state.identity.clone());
    let uid = provisioning::setup_admin(&state.db, &ctx, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(SetupResponse {
            msg: "Admin account created successfully!".to_string(),
            uid,
        }),
    ))
}
