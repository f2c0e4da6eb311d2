//! Math evaluation endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::query::MathRequest;
use crate::types::response::MathResponse;

/// POST /api/math - Evaluate a math expression or question
pub async fn evaluate_math(
    State(state): State<AppState>,
    Json(request): Json<MathRequest>,
) -> Result<Json<MathResponse>> {
    tracing::info!("Math query: \"{}\"", request.expression);

    let result = state.math_agent().run(&request.expression).await;

    Ok(Json(MathResponse {
        expression: request.expression,
        result,
    }))
}
