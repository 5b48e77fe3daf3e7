//! Per-request gate in front of every protected view. Evaluation always
//! terminates in one pass: either the guarded content renders with the
//! resolved user attached, or the request is redirected and nothing below
//! the guard runs.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use surrealdb::{Surreal, engine::any::Any};

use crate::{middleware, models::user::Role, roles, state::AppState};

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const TEACHER_ONLY: &[Role] = &[Role::Teacher];
pub const STUDENT_ONLY: &[Role] = &[Role::Student];
pub const ANY_ROLE: &[Role] = &[Role::Student, Role::Teacher, Role::Admin];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    Unauthorized,
    Pending,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::Login => "/login",
            RedirectTarget::Unauthorized => "/unauthorized",
            RedirectTarget::Pending => "/pending",
        }
    }
}

/// The identity a guarded handler works with, resolved on this very request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub uid: String,
    pub role: Role,
    pub approved: bool,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum GuardOutcome {
    Authorized(CurrentUser),
    Redirecting(RedirectTarget),
}

/// One evaluation pass: no session or failed resolution sends the visitor to
/// `/login`, a role outside the allowed set to `/unauthorized`, and an
/// unapproved student to `/pending` no matter what was requested.
pub async fn evaluate(
    db: &Surreal<Any>,
    session_uid: Option<String>,
    allowed: &[Role],
) -> GuardOutcome {
    let Some(uid) = session_uid else {
        return GuardOutcome::Redirecting(RedirectTarget::Login);
    };

    let info = match roles::resolve_role(db, &uid).await {
        Ok(info) => info,
        Err(_) => return GuardOutcome::Redirecting(RedirectTarget::Login),
    };

    if !allowed.contains(&info.role) {
        return GuardOutcome::Redirecting(RedirectTarget::Unauthorized);
    }

    if info.role == Role::Student && !info.approved {
        return GuardOutcome::Redirecting(RedirectTarget::Pending);
    }

    GuardOutcome::Authorized(CurrentUser {
        uid,
        role: info.role,
        approved: info.approved,
        name: info.name,
    })
}

/// Middleware wrapper around [`evaluate`]; used as
/// `middleware::from_fn(move |req, next| guard::require(state.clone(), ADMIN_ONLY, req, next))`.
pub async fn require(
    state: AppState,
    allowed: &'static [Role],
    mut request: Request,
    next: Next,
) -> Response {
    let session_uid = middleware::bearer_uid(request.headers(), &state.config);

    match evaluate(&state.db, session_uid, allowed).await {
        GuardOutcome::Authorized(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        GuardOutcome::Redirecting(target) => Redirect::to(target.path()).into_response(),
    }
}
