//! Learner registration, login and logout

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedLearner;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 6;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// bcrypt is CPU-bound; keep it off the async workers.
async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &password_hash).unwrap_or(false)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))
}

/// POST /api/learners/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let name = payload.name.trim();
    let email = normalize_email(&payload.email);
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    if !email.contains('@') {
        return Err(ApiError::BadRequest(format!("invalid email: {email}")));
    }
    validate_password(&payload.password)?;

    let password_hash = hash_password(payload.password, state.config.password_cost).await?;
    let (learner, credential, assigned) = state
        .db
        .create_learner(name, &email, &password_hash, state.config.token_ttl)
        .await?;

    tracing::info!(learner = %learner.id, assigned, "learner registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            learner_id: LearnerId(learner.id),
            token: credential.token,
            expires_at: credential.expires_at,
            assigned,
        }),
    ))
}

/// POST /api/learners/login
///
/// Issues a new token for an existing learner. Unknown email and wrong
/// password get the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let email = normalize_email(&payload.email);
    let rejected = || ApiError::Unauthorized("invalid email or password".to_string());

    let learner = state
        .db
        .find_learner_by_email(&email)
        .await?
        .ok_or_else(rejected)?;

    if !verify_password(payload.password, learner.password_hash.clone()).await? {
        tracing::warn!(learner = %learner.id, "login rejected");
        return Err(rejected());
    }

    let credential = state
        .db
        .issue_credential(learner.id, state.config.token_ttl)
        .await?;

    tracing::info!(learner = %learner.id, "learner logged in");

    Ok(Json(LoginResponse {
        learner_id: LearnerId(learner.id),
        token: credential.token,
        expires_at: credential.expires_at,
    }))
}

/// POST /api/learners/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
) -> Result<Json<LogoutResponse>> {
    let revoked = state.db.revoke_credential(&auth.token, Utc::now()).await?;
    tracing::info!(learner = %auth.learner_id, "token revoked");
    Ok(Json(LogoutResponse { revoked }))
}
