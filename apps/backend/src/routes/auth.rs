//! Authentication middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::LearnerId;
use crate::AppState;

/// Authenticated learner stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedLearner {
    pub learner_id: LearnerId,
    pub token: String,
}

/// Auth middleware - resolves the bearer token to a learner
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?
        .to_string();

    let credential = state
        .db
        .get_credential(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown token".to_string()))?;

    if credential.revoked_at.is_some() {
        return Err(ApiError::Unauthorized("Token has been revoked".to_string()));
    }
    if !credential.is_active(Utc::now()) {
        return Err(ApiError::Unauthorized("Token has expired".to_string()));
    }

    request.extensions_mut().insert(AuthenticatedLearner {
        learner_id: LearnerId(credential.learner_id),
        token,
    });

    Ok(next.run(request).await)
}
