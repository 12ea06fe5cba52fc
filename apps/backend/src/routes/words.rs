//! Word set endpoints: batches and partition transitions

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use vocab_core::{BatchLimit, Transition};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedLearner;
use crate::AppState;

/// GET /api/words/batch?partition=&limit=
pub async fn batch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    Query(query): Query<BatchQuery>,
) -> Result<Json<BatchResponse>> {
    let limit = BatchLimit::new(query.limit)?;
    let words = state
        .db
        .fetch_batch(auth.learner_id, query.partition, limit)
        .await?;
    Ok(Json(BatchResponse { words }))
}

/// POST /api/words/promote
pub async fn promote(
    state: State<AppState>,
    auth: Extension<AuthenticatedLearner>,
    payload: Json<TransitionRequest>,
) -> Result<Json<PartitionResponse>> {
    transition(state, auth, payload, Transition::Promote).await
}

/// POST /api/words/escalate
pub async fn escalate(
    state: State<AppState>,
    auth: Extension<AuthenticatedLearner>,
    payload: Json<TransitionRequest>,
) -> Result<Json<PartitionResponse>> {
    transition(state, auth, payload, Transition::Escalate).await
}

/// POST /api/words/retire
pub async fn retire(
    state: State<AppState>,
    auth: Extension<AuthenticatedLearner>,
    payload: Json<TransitionRequest>,
) -> Result<Json<PartitionResponse>> {
    transition(state, auth, payload, Transition::Retire).await
}

async fn transition(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    Json(payload): Json<TransitionRequest>,
    transition: Transition,
) -> Result<Json<PartitionResponse>> {
    let partition = state
        .db
        .apply_transition(auth.learner_id, payload.word_id, transition)
        .await?;
    Ok(Json(PartitionResponse {
        word_id: payload.word_id,
        partition: Some(partition),
    }))
}

/// GET /api/words/:word_id/partition
pub async fn partition(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedLearner>,
    Path(word_id): Path<Uuid>,
) -> Result<Json<PartitionResponse>> {
    let word_id = WordId(word_id);
    let partition = state.db.partition_of(auth.learner_id, word_id).await?;
    Ok(Json(PartitionResponse { word_id, partition }))
}
