use axum::{
    Json, Router,
    extract::{Extension, State},
    middleware as axum_middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    audit,
    errors::Result,
    guard::{self, CurrentUser},
    identity::AuthContext,
    middleware::{SessionUid, auth_jwt_middleware},
    models::user::Role,
    state::AppState,
    utils::validated_form::ValidatedJson,
};

pub fn router(state: AppState) -> Router<AppState> {
    let view = Router::new().route("/", get(profile)).layer({
        let state = state.clone();
        axum_middleware::from_fn(move |req, next| {
            guard::require(state.clone(), guard::ANY_ROLE, req, next)
        })
    });

    let actions = Router::new()
        .route("/password", post(change_password))
        .layer(axum_middleware::from_fn_with_state(state, auth_jwt_middleware));

    view.merge(actions)
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub uid: String,
    pub role: Role,
    pub approved: bool,
    pub name: String,
}

pub async fn profile(Extension(user): Extension<CurrentUser>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        uid: user.uid,
        role: user.role,
        approved: user.approved,
        name: user.name,
    })
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "new password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordResponse {
    pub msg: String,
}

/// Re-authenticates with the current password before changing it, the same
/// dance the provider demands.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(SessionUid(uid)): Extension<SessionUid>,
    ValidatedJson(input): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>> {
    let user = state.identity.account_user(&uid).await?;
    let ctx = AuthContext::resume(state.identity.clone(), user);
    ctx.change_password(&input.current_password, &input.new_password)
        .await?;

    audit::record(state.db.clone(), uid, "User changed password");

    Ok(Json(ChangePasswordResponse {
        msg: "Password changed successfully".to_string(),
    }))
}
