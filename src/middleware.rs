use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::{Error, Result as RResult};
use crate::state::{AppState, Config};
use crate::utils::jwt::decode_jwt;

#[derive(Debug, Clone)]
pub struct SessionUid(pub String);

/// Strict bearer authentication for action endpoints; a missing or bad token
/// is a 401, not a redirect. View routes go through the route guard instead.
pub async fn auth_jwt_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, Response> {
    let request = buffer_request_and_authenticate(&state, request).await?;

    Ok(next.run(request).await)
}

async fn buffer_request_and_authenticate(
    state: &AppState,
    request: Request,
) -> Result<Request, Response> {
    let (mut parts, body) = request.into_parts();
    let uid = check_auth_parts(&state.config, &parts).map_err(IntoResponse::into_response)?;

    parts.extensions.insert(uid);

    Ok(Request::from_parts(parts, body))
}

fn check_auth_parts(config: &Config, parts: &Parts) -> RResult<SessionUid> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(Error::MissingToken)?
        .to_str()
        .map_err(|_| Error::InvalidToken)?;

    let mut parts = header_value.trim().splitn(2, ' ');

    let scheme = parts.next().ok_or(Error::MissingToken)?;
    let token = parts.next().ok_or(Error::MissingToken)?;

    if scheme != "Bearer" {
        tracing::warn!("Invalid auth scheme: {scheme}");
        return Err(Error::InvalidScheme);
    }

    let data = decode_jwt(token, &config.jwt_secret).map_err(|err| match err {
        Error::JwtError(ref jwt)
            if matches!(jwt.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) =>
        {
            Error::TokenExpired
        }
        _ => Error::InvalidToken,
    })?;
    Ok(SessionUid(data.claims.id))
}

/// Lenient variant for the route guard: any absent or undecodable token is
/// simply "no session", which the guard turns into a `/login` redirect.
pub fn bearer_uid(headers: &HeaderMap, config: &Config) -> Option<String> {
    let header_value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = header_value.trim().splitn(2, ' ');
    let scheme = parts.next()?;
    let token = parts.next()?;
    if scheme != "Bearer" {
        return None;
    }
    decode_jwt(token, &config.jwt_secret)
        .ok()
        .map(|data| data.claims.id)
}
