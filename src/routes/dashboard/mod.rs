use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use crate::{
    guard::{self, GuardOutcome},
    middleware,
    models::user::Role,
    state::AppState,
};

pub mod admin;
pub mod student;
pub mod teacher;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(dispatch))
        .nest("/admin", admin::router(state.clone()))
        .nest("/teacher", teacher::router(state.clone()))
        .nest("/student", student::router(state))
}

/// Sends a signed-in visitor to the dashboard their role owns. Exhaustive on
/// purpose: a new role variant has to pick a home before this compiles.
pub async fn dispatch(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session_uid = middleware::bearer_uid(&headers, &state.config);

    match guard::evaluate(&state.db, session_uid, guard::ANY_ROLE).await {
        GuardOutcome::Authorized(user) => {
            let target = match user.role {
                Role::Admin => "/dashboard/admin",
                Role::Teacher => "/dashboard/teacher",
                Role::Student => "/dashboard/student",
            };
            Redirect::to(target).into_response()
        }
        GuardOutcome::Redirecting(target) => Redirect::to(target.path()).into_response(),
    }
}
