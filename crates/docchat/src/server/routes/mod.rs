//! API routes

pub mod documents;
pub mod math;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Document management
        .route(
            "/upload",
            post(documents::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/documents", get(documents::list_documents))
        .route("/documents", delete(documents::delete_all_documents))
        .route("/documents/:filename", delete(documents::delete_document))
        // Query
        .route("/query", post(query::query_documents))
        .route("/stats", get(query::collection_stats))
        // Math
        .route("/math", post(math::evaluate_math))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "docchat",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document Q&A with retrieval-augmented answers and math evaluation",
        "endpoints": {
            "POST /api/upload": "Upload text/PDF documents",
            "POST /api/query": "Ask a question over the uploaded documents",
            "GET /api/documents": "List uploaded documents",
            "DELETE /api/documents/:filename": "Delete a document",
            "DELETE /api/documents": "Delete all documents",
            "POST /api/math": "Evaluate a math expression",
            "GET /api/stats": "Collection statistics"
        }
    }))
}
