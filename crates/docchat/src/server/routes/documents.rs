//! Document upload and management endpoints

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::response::{DeleteResponse, DocumentListResponse, UploadResponse};

/// Upload extensions accepted by the service
const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf"];

fn extension_is_valid(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// POST /api/upload - Upload files and rebuild the pipeline
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::internal(format!("Failed to read multipart field: {}", e)))?
    {
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Config("Multipart field has no filename".to_string()))?;

        if !extension_is_valid(&filename) {
            return Err(Error::UnsupportedFileType(format!(
                "{} (allowed: {:?})",
                filename, ALLOWED_EXTENSIONS
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::internal(format!("Failed to read file: {}", e)))?;

        // Unique prefix avoids collisions between uploads with the same name
        let unique_filename = format!("{}_{}", Uuid::new_v4(), filename);
        tokio::fs::write(state.document_path(&unique_filename), &data).await?;

        tracing::info!("Saved upload {} ({} bytes)", unique_filename, data.len());
        uploaded.push(unique_filename);
    }

    state.rebuild_pipeline().await?;

    Ok(Json(UploadResponse {
        message: format!("Successfully uploaded {} files", uploaded.len()),
        files: uploaded,
    }))
}

/// GET /api/documents - List uploaded documents
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentListResponse>> {
    let documents = state.list_documents()?;
    let count = documents.len();

    Ok(Json(DocumentListResponse { documents, count }))
}

/// DELETE /api/documents/:filename - Delete one document
pub async fn delete_document(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>> {
    // Uploaded names never contain path separators
    if filename.contains('/') || filename.contains("..") {
        return Err(Error::DocumentNotFound(filename));
    }

    let path = state.document_path(&filename);
    if !path.is_file() {
        return Err(Error::DocumentNotFound(filename));
    }

    tokio::fs::remove_file(&path).await?;

    if state.has_documents() {
        state.rebuild_pipeline().await?;
    } else {
        state.clear_pipeline();
    }

    Ok(Json(DeleteResponse {
        message: format!("Document {} deleted successfully", filename),
    }))
}

/// DELETE /api/documents - Delete all documents
pub async fn delete_all_documents(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>> {
    for filename in state.list_documents()? {
        tokio::fs::remove_file(state.document_path(&filename)).await?;
    }

    state.clear_pipeline();

    Ok(Json(DeleteResponse {
        message: "All documents deleted successfully".to_string(),
    }))
}
