use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    middleware as axum_middleware,
    routing::post,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    audit,
    errors::Result,
    identity::AuthContext,
    middleware::{SessionUid, auth_jwt_middleware},
    models::user::Role,
    provisioning::{self, RegisterRequest},
    roles,
    state::AppState,
    utils::{jwt::encode_jwt, validated_form::ValidatedJson},
};

pub fn router(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/register", post(register))
        .route("/signin", post(sign_in));

    // The key extractor needs a peer address, which oneshot test requests do
    // not carry, so the limiter only wraps the real server build.
    #[cfg(not(test))]
    let open = {
        use std::{sync::Arc, time::Duration};
        use tower_governor::{
            GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
        };

        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(2)
                .burst_size(10)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .unwrap(),
        );
        let governor_limiter = governor_conf.limiter().clone();
        let interval = Duration::from_secs(60);
        // a separate background task to clean up
        std::thread::spawn(move || {
            loop {
                std::thread::sleep(interval);
                tracing::info!("rate limiting storage size: {}", governor_limiter.len());
                governor_limiter.retain_recent();
            }
        });

        open.layer(GovernorLayer {
            config: governor_conf,
        })
    };

    let protected = Router::new()
        .route("/signout", post(sign_out))
        .layer(axum_middleware::from_fn_with_state(state, auth_jwt_middleware));

    open.merge(protected)
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub msg: String,
    pub uid: String,
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let email = input.email.clone();
    let ctx = AuthContext::new(state.identity.clone());
    let uid = provisioning::register(&state.db, &ctx, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            msg: format!("user with email: {email} created"),
            uid,
        }),
    ))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub uid: String,
    pub role: Role,
    pub approved: bool,
    pub name: String,
}

pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SignInRequest>,
) -> Result<Json<SignInResponse>> {
    let user = state
        .identity
        .verify_credentials(&input.email, &input.password)
        .await?;
    let info = roles::resolve_role(&state.db, &user.uid).await?;

    audit::record(state.db.clone(), user.uid.clone(), "User logged in");

    let token = encode_jwt(&user.uid, &state.config.jwt_secret)?;
    Ok(Json(SignInResponse {
        token,
        uid: user.uid,
        role: info.role,
        approved: info.approved,
        name: info.name,
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct SignOutResponse {
    pub msg: String,
}

/// Bearer tokens are discarded client-side; the server's part of signing out
/// is the audit trail entry.
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(SessionUid(uid)): Extension<SessionUid>,
) -> Result<Json<SignOutResponse>> {
    audit::record(state.db.clone(), uid, "User logged out");
    Ok(Json(SignOutResponse {
        msg: "signed out".to_string(),
    }))
}
