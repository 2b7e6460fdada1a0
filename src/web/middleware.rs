use super::app::AppState;
use super::Result;
use crate::core::{AuthFailure, FilmError};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header;
use tracing::debug;

/// Rejects requests without a valid `Authorization: Bearer <token>` header.
///
/// No header answers 401, anything unusable answers 403. Verified claims are
/// stored in the request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let Some(raw) = request.headers().get(header::AUTHORIZATION) else {
        return Err(FilmError::Auth(AuthFailure::MissingToken).into());
    };

    let token = raw
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(FilmError::Auth(AuthFailure::InvalidToken))?;

    let claims = state.tokens.verify(token).inspect_err(|_| {
        debug!(path = %request.uri().path(), "rejected bearer token");
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
