//! Catalog lookups

use axum::{
    extract::{Query, State},
    Json,
};

use crate::db::TextColumn;
use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/catalog/source?text=
pub async fn by_source(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Result<Json<TranslationsResponse>> {
    let words = state.db.find_by_text(TextColumn::Source, &query.text).await?;
    Ok(Json(TranslationsResponse { words }))
}

/// GET /api/catalog/target?text=
pub async fn by_target(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Result<Json<TranslationsResponse>> {
    let words = state.db.find_by_text(TextColumn::Target, &query.text).await?;
    Ok(Json(TranslationsResponse { words }))
}
