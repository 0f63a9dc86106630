use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::db::models::{Document, Question, Quiz, QuizSubmission};
use crate::service::chat_client::ChatCompletion;
use crate::service::scheduler::Scheduler;

pub struct AppState {
    pub upload_dir: PathBuf,
    pub scheduler: Scheduler,
    pub chat: Arc<dyn ChatCompletion>,
    pub max_file_size: usize,
}

/// Public document representation; field names are part of the client
/// contract and must not change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: String,
    pub upload_date: Option<String>,
    pub processed_at: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub page_count: Option<i32>,
    pub tags: Vec<String>,
    pub user_id: String,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        let tags = document
            .tags
            .as_ref()
            .and_then(|value| serde_json::from_value::<Vec<String>>(value.clone()).ok())
            .unwrap_or_default();

        DocumentResponse {
            id: document.id.to_string(),
            name: document.filename,
            original_name: document.original_name,
            file_size: document.file_size,
            mime_type: document.mime_type,
            status: document.processing_status,
            upload_date: document.uploaded_at.map(|t| t.to_rfc3339()),
            processed_at: document.processed_at.map(|t| t.to_rfc3339()),
            summary: document.summary,
            content: document.content,
            page_count: document.page_count,
            tags,
            user_id: document.user_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentStatusResponse {
    pub status: String,
    pub processing_complete: bool,
    pub processed_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub options: Option<serde_json::Value>,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

impl From<Question> for QuestionResponse {
    fn from(question: Question) -> Self {
        QuestionResponse {
            id: question.id.to_string(),
            text: question.question_text,
            question_type: question.question_type,
            options: question.options,
            correct_answer: question.correct_answer,
            explanation: question.explanation,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: String,
    pub document_id: String,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub total_questions: usize,
    pub estimated_duration: i32,
    pub created_at: Option<String>,
    pub questions: Vec<QuestionResponse>,
}

impl QuizResponse {
    pub fn from_parts(quiz: Quiz, questions: Vec<Question>) -> Self {
        QuizResponse {
            id: quiz.id.to_string(),
            document_id: quiz.document_id.to_string(),
            title: quiz.title,
            description: quiz.description,
            difficulty: quiz.difficulty,
            total_questions: questions.len(),
            estimated_duration: quiz.estimated_duration.unwrap_or(10),
            created_at: quiz.created_at.map(|t| t.to_rfc3339()),
            questions: questions.into_iter().map(QuestionResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub answers: serde_json::Value,
    pub score: i32,
    pub time_spent: Option<i32>,
    pub completed_at: Option<String>,
}

impl From<QuizSubmission> for SubmissionResponse {
    fn from(submission: QuizSubmission) -> Self {
        SubmissionResponse {
            id: submission.id.to_string(),
            quiz_id: submission.quiz_id.to_string(),
            user_id: submission.user_id.to_string(),
            answers: submission.answers,
            score: submission.score,
            time_spent: submission.time_spent,
            completed_at: submission.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuizGenerateRequest {
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default)]
    pub options: Option<QuizGenerateOptions>,
}

#[derive(Debug, Deserialize, Default)]
pub struct QuizGenerateOptions {
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(rename = "questionCount", default)]
    pub question_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct QuizAnswer {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct QuizSubmissionRequest {
    pub answers: Vec<QuizAnswer>,
    #[serde(rename = "timeSpent", default)]
    pub time_spent: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AssessmentSubmissionRequest {
    pub responses: Vec<crate::service::assessment::AssessmentResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResultResponse {
    pub id: String,
    pub learning_style: String,
    pub visual_score: i32,
    pub auditory_score: i32,
    pub kinesthetic_score: i32,
    pub reading_score: i32,
    pub completed_at: Option<String>,
}

impl From<crate::db::models::LearningAssessment> for AssessmentResultResponse {
    fn from(assessment: crate::db::models::LearningAssessment) -> Self {
        AssessmentResultResponse {
            id: assessment.id.to_string(),
            learning_style: assessment.learning_style_result,
            visual_score: assessment.visual_score,
            auditory_score: assessment.auditory_score,
            kinesthetic_score: assessment.kinesthetic_score,
            reading_score: assessment.reading_score,
            completed_at: assessment.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}
