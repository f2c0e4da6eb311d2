//! Query and stats endpoints

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::query::QueryRequest;
use crate::types::response::{QueryResponse, StatsResponse};

/// POST /api/query - Answer a question over the uploaded documents
pub async fn query_documents(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let pipeline = state.pipeline().ok_or(Error::NoDocuments)?;

    let start = Instant::now();
    tracing::info!("Query: \"{}\"", request.query);

    // Retrieval failures propagate as hard errors; generation failures come
    // back as the answer string
    let result = pipeline.process_query(&request.query).await?;

    let processing_time = (start.elapsed().as_secs_f64() * 100.0).round() / 100.0;

    tracing::info!(
        "Query completed in {}s with {} passages",
        processing_time,
        result.retrieved_count
    );

    Ok(Json(QueryResponse {
        query: result.query,
        answer: result.answer,
        sources: result.sources,
        retrieved_count: result.retrieved_count,
        processing_time,
    }))
}

/// GET /api/stats - Collection statistics
pub async fn collection_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let document_count = match state.pipeline() {
        Some(pipeline) => pipeline.collection_stats().await?.document_count,
        None => 0,
    };

    Ok(Json(StatsResponse { document_count }))
}
