//! Middleware enforcing the configured [`SecurityPolicy`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use bookshelf_authz::SecurityPolicy;

use crate::error::AppError;

pub async fn enforce(
    State(policy): State<SecurityPolicy>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    policy
        .authorize(request.uri().path())
        .map_err(|denied| AppError::unauthorized(denied.to_string()))?;
    Ok(next.run(request).await)
}
