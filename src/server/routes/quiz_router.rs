use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::Connection;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    get_database_connection,
    models::{
        DifficultyLevel, Document, NewQuiz, NewQuizSubmission, ProcessingStatus, Question, Quiz,
        QuizSubmission,
    },
};
use crate::server::auth::UserId;
use crate::server::errors::AppError;
use crate::server::serializers::{
    AppState, QuizGenerateRequest, QuizResponse, QuizSubmissionRequest, SubmissionResponse,
};
use crate::service::processor::{estimated_duration, quiz_title, to_new_questions};
use crate::service::quiz_generator::generate_questions;
use crate::service::scoring::calculate_score;

const MAX_QUESTION_COUNT: usize = 50;
const DEFAULT_QUESTION_COUNT: usize = 10;

/// Quiz generation needs a completed pipeline run behind it: the document
/// must be `processed` and carry extracted content. Nothing is written when
/// this rejects.
fn generation_source(document: &Document) -> Result<&str, AppError> {
    if document.status() != ProcessingStatus::Processed {
        return Err(AppError::BadRequest(
            "Document must be fully processed before generating quiz".to_string(),
        ));
    }

    match document.content.as_deref() {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(AppError::BadRequest(
            "Document content not available".to_string(),
        )),
    }
}

pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(request): Json<QuizGenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let document_id = Uuid::parse_str(&request.document_id)
        .map_err(|_| AppError::BadRequest("Invalid document id".to_string()))?;

    let mut conn = get_database_connection()?;

    let document = Document::find_for_user(&mut conn, document_id, user_id)
        .map_err(|_| AppError::NotFoundError("Document not found".to_string()))?;

    let content = generation_source(&document)?;

    let options = request.options.unwrap_or_default();
    let difficulty = match options.difficulty.as_deref() {
        Some(label) => DifficultyLevel::parse(label).map_err(AppError::BadRequest)?,
        None => DifficultyLevel::Medium,
    };
    let question_count = options
        .question_count
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .min(MAX_QUESTION_COUNT);

    let questions =
        generate_questions(state.chat.as_ref(), content, question_count, difficulty).await;

    if questions.is_empty() {
        return Err(AppError::UpstreamError(
            "Failed to generate quiz questions".to_string(),
        ));
    }

    let document_name = document.original_name.clone();
    let response = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let quiz = Quiz::create(
            conn,
            NewQuiz {
                document_id,
                title: quiz_title(&document_name),
                description: Some(format!("Auto-generated quiz from {}", document_name)),
                difficulty: difficulty.as_str().to_string(),
                estimated_duration: Some(estimated_duration(questions.len())),
            },
        )?;
        let stored = Question::create_batch(conn, &to_new_questions(quiz.id, &questions))?;
        Ok(QuizResponse::from_parts(quiz, stored))
    })?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_quizzes(UserId(user_id): UserId) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let quizzes = Quiz::find_for_user_all(&mut conn, user_id)?;

    let mut response = Vec::with_capacity(quizzes.len());
    for quiz in quizzes {
        let questions = Question::find_by_quiz(&mut conn, quiz.id)?;
        response.push(QuizResponse::from_parts(quiz, questions));
    }

    Ok(Json(response))
}

pub async fn get_quiz(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let quiz = Quiz::find_for_user(&mut conn, id, user_id)
        .map_err(|_| AppError::NotFoundError("Quiz not found".to_string()))?;
    let questions = Question::find_by_quiz(&mut conn, quiz.id)?;

    Ok(Json(QuizResponse::from_parts(quiz, questions)))
}

/// Scores the submitted answers and records an immutable submission row;
/// history is preserved across repeat attempts.
pub async fn submit_quiz(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
    Json(request): Json<QuizSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let quiz = Quiz::find_for_user(&mut conn, id, user_id)
        .map_err(|_| AppError::NotFoundError("Quiz not found".to_string()))?;
    let questions = Question::find_by_quiz(&mut conn, quiz.id)?;

    let answers: HashMap<String, String> = request
        .answers
        .into_iter()
        .map(|answer| (answer.question_id, answer.answer))
        .collect();

    let score = calculate_score(&questions, &answers);

    let submission = QuizSubmission::create(
        &mut conn,
        NewQuizSubmission {
            quiz_id: quiz.id,
            user_id,
            answers: serde_json::json!(answers),
            score,
            time_spent: request.time_spent,
        },
    )?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(submission))))
}

pub async fn list_quiz_submissions(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let quiz = Quiz::find_for_user(&mut conn, id, user_id)
        .map_err(|_| AppError::NotFoundError("Quiz not found".to_string()))?;

    let submissions = QuizSubmission::find_for_quiz_user(&mut conn, quiz.id, user_id)?;
    let response: Vec<SubmissionResponse> = submissions
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();

    Ok(Json(response))
}

pub async fn delete_quiz(
    UserId(user_id): UserId,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let quiz = Quiz::find_for_user(&mut conn, id, user_id)
        .map_err(|_| AppError::NotFoundError("Quiz not found".to_string()))?;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        QuizSubmission::delete_by_quiz(conn, quiz.id)?;
        Question::delete_by_quiz(conn, quiz.id)?;
        Quiz::delete(conn, quiz.id)?;
        Ok(())
    })?;

    Ok(Json(serde_json::json!({
        "message": "Quiz deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document(status: ProcessingStatus, content: Option<&str>) -> Document {
        Document {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            filename: "stored.pdf".to_string(),
            original_name: "notes.pdf".to_string(),
            file_path: "/tmp/stored.pdf".to_string(),
            file_size: 128,
            mime_type: "application/pdf".to_string(),
            file_hash: None,
            page_count: Some(1),
            content: content.map(|c| c.to_string()),
            summary: None,
            key_topics: None,
            tags: None,
            processing_status: status.as_str().to_string(),
            uploaded_at: Some(Utc::now()),
            processed_at: None,
        }
    }

    #[test]
    fn test_generation_rejected_unless_processed() {
        for status in [
            ProcessingStatus::Pending,
            ProcessingStatus::Processing,
            ProcessingStatus::Failed,
        ] {
            let document = document(status, Some("chapter text"));
            assert!(matches!(
                generation_source(&document),
                Err(AppError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn test_generation_rejected_without_content() {
        let missing = document(ProcessingStatus::Processed, None);
        assert!(matches!(
            generation_source(&missing),
            Err(AppError::BadRequest(_))
        ));

        let blank = document(ProcessingStatus::Processed, Some("   "));
        assert!(matches!(
            generation_source(&blank),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_generation_allowed_for_processed_document() {
        let document = document(ProcessingStatus::Processed, Some("chapter text"));
        assert_eq!(generation_source(&document).unwrap(), "chapter text");
    }
}
