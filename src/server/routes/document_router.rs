use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::Connection;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};
use uuid::Uuid;

use crate::db::{
    get_database_connection,
    models::{Document, NewDocument, ProcessingStatus, Question, Quiz, QuizSubmission},
};
use crate::server::auth::UserId;
use crate::server::errors::AppError;
use crate::server::serializers::{AppState, DocumentResponse, DocumentStatusResponse};
use crate::service::scheduler::ScheduleError;

pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::FileUploadError(format!("Failed to process form: {}", e)))?
    {
        let Some(original_name) = field.file_name().map(|name| name.to_string()) else {
            continue;
        };

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_default();
        if content_type != "application/pdf" {
            return Err(AppError::FileUploadError(
                "Only PDF files are supported".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::FileUploadError(format!("Failed to read file data: {}", e)))?;

        if data.len() > state.max_file_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size: {} bytes",
                state.max_file_size
            )));
        }

        let file_id = Uuid::new_v4();
        let stored_name = format!("{}.pdf", file_id);
        let file_path = state.upload_dir.join(&stored_name);

        let mut file = File::create(&file_path)
            .await
            .map_err(|e| AppError::FileUploadError(format!("Failed to create file: {}", e)))?;
        file.write_all(&data)
            .await
            .map_err(|e| AppError::FileUploadError(format!("Failed to write file: {}", e)))?;

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let file_hash = format!("{:x}", hasher.finalize());

        let new_document = NewDocument {
            user_id,
            filename: stored_name,
            original_name,
            file_path: file_path.to_string_lossy().to_string(),
            file_size: data.len() as i64,
            mime_type: content_type,
            file_hash: Some(file_hash),
            processing_status: ProcessingStatus::Pending.as_str().to_string(),
        };

        let mut conn = get_database_connection()?;

        // The just-saved file must not outlive a failed insert; orphaned
        // storage is worse than a failed upload.
        let document = match Document::create(&mut conn, new_document) {
            Ok(document) => document,
            Err(e) => {
                remove_file_best_effort(&file_path.to_string_lossy()).await;
                return Err(AppError::DatabaseError(format!(
                    "Document could not be created: {}",
                    e
                )));
            }
        };

        if let Err(e) = state.scheduler.schedule_document(document.id) {
            let _ = Document::delete(&mut conn, document.id);
            remove_file_best_effort(&document.file_path).await;
            return Err(match e {
                ScheduleError::QueueFull => AppError::ServiceUnavailable(
                    "Processing queue is full, try again later".to_string(),
                ),
                ScheduleError::Closed => {
                    AppError::ServiceUnavailable("Processing is unavailable".to_string())
                }
            });
        }

        return Ok((
            StatusCode::CREATED,
            Json(DocumentResponse::from(document)),
        ));
    }

    Err(AppError::FileUploadError("No file provided".to_string()))
}

pub async fn list_documents(UserId(user_id): UserId) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let documents = Document::find_for_user_all(&mut conn, user_id)?;
    let response: Vec<DocumentResponse> = documents.into_iter().map(DocumentResponse::from).collect();

    Ok(Json(response))
}

pub async fn get_document(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let document = Document::find_for_user(&mut conn, id, user_id)
        .map_err(|_| AppError::NotFoundError("Document not found".to_string()))?;

    Ok(Json(DocumentResponse::from(document)))
}

pub async fn get_document_status(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let document = Document::find_for_user(&mut conn, id, user_id)
        .map_err(|_| AppError::NotFoundError("Document not found".to_string()))?;

    Ok(Json(status_response(&document)))
}

/// Polling contract: `processing_complete` flips only when the pipeline has
/// finished successfully; `failed` stays incomplete.
fn status_response(document: &Document) -> DocumentStatusResponse {
    DocumentStatusResponse {
        status: document.processing_status.clone(),
        processing_complete: document.status() == ProcessingStatus::Processed,
        processed_at: document.processed_at.map(|t| t.to_rfc3339()),
    }
}

/// Returns an explanatory placeholder instead of an error while the summary
/// is not available yet, so clients can poll one endpoint.
pub async fn get_document_summary(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let document = Document::find_for_user(&mut conn, id, user_id)
        .map_err(|_| AppError::NotFoundError("Document not found".to_string()))?;

    let Some(summary) = document.summary else {
        let placeholder = match document.status() {
            ProcessingStatus::Processing => "Summary is being generated. Please wait...",
            ProcessingStatus::Failed => {
                "Summary generation failed. Please try re-uploading the document."
            }
            _ => "Summary not yet available. Document may still be processing.",
        };
        return Ok(Json(serde_json::json!({ "summary": placeholder })));
    };

    Ok(Json(serde_json::json!({
        "summary": summary,
        "key_topics": document.key_topics.unwrap_or_else(|| serde_json::json!([])),
    })))
}

/// Explicit, ordered deletion inside one transaction: submissions and
/// questions first, then quizzes, then the document row. The backing file
/// goes last, after the commit.
pub async fn delete_document(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let document = Document::find_for_user(&mut conn, id, user_id)
        .map_err(|_| AppError::NotFoundError("Document not found".to_string()))?;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let quizzes = Quiz::find_by_document(conn, document.id)?;
        for quiz in &quizzes {
            QuizSubmission::delete_by_quiz(conn, quiz.id)?;
            Question::delete_by_quiz(conn, quiz.id)?;
            Quiz::delete(conn, quiz.id)?;
        }
        Document::delete(conn, document.id)?;
        Ok(())
    })?;

    remove_file_best_effort(&document.file_path).await;

    Ok(Json(serde_json::json!({
        "message": "Document deleted successfully"
    })))
}

async fn remove_file_best_effort(path: &str) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("stored file already missing: {}", path);
        }
        Err(e) => {
            error!("failed to remove stored file {}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document(status: ProcessingStatus) -> Document {
        Document {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            filename: "stored.pdf".to_string(),
            original_name: "notes.pdf".to_string(),
            file_path: "/tmp/stored.pdf".to_string(),
            file_size: 128,
            mime_type: "application/pdf".to_string(),
            file_hash: None,
            page_count: None,
            content: None,
            summary: None,
            key_topics: None,
            tags: None,
            processing_status: status.as_str().to_string(),
            uploaded_at: Some(Utc::now()),
            processed_at: None,
        }
    }

    #[test]
    fn test_status_polling_across_lifecycle() {
        let mut doc = document(ProcessingStatus::Pending);

        let response = status_response(&doc);
        assert_eq!(response.status, "pending");
        assert!(!response.processing_complete);
        assert!(response.processed_at.is_none());

        doc.processing_status = ProcessingStatus::Processing.as_str().to_string();
        let response = status_response(&doc);
        assert_eq!(response.status, "processing");
        assert!(!response.processing_complete);

        doc.processing_status = ProcessingStatus::Processed.as_str().to_string();
        doc.processed_at = Some(Utc::now());
        let response = status_response(&doc);
        assert_eq!(response.status, "processed");
        assert!(response.processing_complete);
        assert!(response.processed_at.is_some());
    }

    #[test]
    fn test_failed_document_is_not_complete() {
        let response = status_response(&document(ProcessingStatus::Failed));
        assert_eq!(response.status, "failed");
        assert!(!response.processing_complete);
    }
}
