use std::sync::Arc;

use chrono::Utc;
use diesel::Connection;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::{
    get_database_connection,
    models::{
        DifficultyLevel, Document, NewQuestion, NewQuiz, ProcessingStatus, Question, QuestionType,
        Quiz,
    },
};
use crate::pdf::extract_document_text;
use crate::service::chat_client::ChatCompletion;
use crate::service::quiz_generator::{GeneratedQuestion, generate_questions};
use crate::service::scheduler::DocumentEvent;
use crate::service::summarizer::{SUMMARY_FAILED_SENTINEL, SummaryResult, generate_summary};

/// Questions generated automatically during the upload pipeline. Explicit
/// `POST /quizzes/generate` requests choose their own count.
const PIPELINE_QUESTION_COUNT: usize = 5;

enum RunOutcome {
    Completed,
    /// The document was not in `pending` when the worker picked it up;
    /// running again would append a duplicate quiz.
    Skipped,
}

/// Drains the scheduler queue with a fixed pool of workers. Each run opens
/// its own database connection, independent of the HTTP request that
/// triggered it.
pub struct DocumentProcessor {
    receiver: Arc<Mutex<mpsc::Receiver<DocumentEvent>>>,
    chat: Arc<dyn ChatCompletion>,
    worker_count: usize,
}

impl DocumentProcessor {
    pub fn new(receiver: mpsc::Receiver<DocumentEvent>, chat: Arc<dyn ChatCompletion>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
            chat,
            worker_count: 3,
        }
    }

    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    pub async fn start(self) {
        info!(workers = self.worker_count, "document processor starting");

        let mut handles = Vec::new();
        for worker_id in 0..self.worker_count {
            let receiver = self.receiver.clone();
            let chat = self.chat.clone();
            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, receiver, chat).await;
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!("worker {} panicked: {}", i, e);
            }
        }

        info!("document processor stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<DocumentEvent>>>,
    chat: Arc<dyn ChatCompletion>,
) {
    info!("worker {} started", worker_id);

    loop {
        let event = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        match event {
            Some(event) => {
                info!(
                    worker = worker_id,
                    document = %event.document_id,
                    "processing document"
                );
                process_document(chat.as_ref(), event.document_id).await;
            }
            None => break,
        }
    }

    info!("worker {} stopped", worker_id);
}

/// One end-to-end processing run: extract, summarize + generate, persist.
/// Any failure rolls back partial writes and moves the document to `failed`.
pub async fn process_document(chat: &dyn ChatCompletion, document_id: Uuid) {
    let started = std::time::Instant::now();

    match run_pipeline(chat, document_id).await {
        Ok(RunOutcome::Completed) => {
            info!(
                document = %document_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "document processed"
            );
        }
        Ok(RunOutcome::Skipped) => {}
        Err(reason) => {
            error!(document = %document_id, "processing failed: {}", reason);
            mark_failed(document_id);
        }
    }
}

async fn run_pipeline(chat: &dyn ChatCompletion, document_id: Uuid) -> Result<RunOutcome, String> {
    let mut conn =
        get_database_connection().map_err(|e| format!("database connection failed: {}", e))?;

    let document = Document::find(&mut conn, document_id)
        .map_err(|e| format!("document lookup failed: {}", e))?;

    if document.status() != ProcessingStatus::Pending {
        warn!(
            document = %document_id,
            status = %document.status(),
            "skipping run for non-pending document"
        );
        return Ok(RunOutcome::Skipped);
    }

    // Committed immediately so concurrent status polls observe the transition.
    Document::set_status(&mut conn, document_id, ProcessingStatus::Processing)
        .map_err(|e| format!("status update failed: {}", e))?;

    let file_path = document.file_path.clone();
    let (text, pages) = tokio::task::spawn_blocking(move || extract_document_text(file_path))
        .await
        .map_err(|e| format!("extraction task failed: {}", e))?;

    if text.trim().is_empty() {
        return Err("failed to extract text from PDF".to_string());
    }

    // Neither AI call depends on the other's output, only on the same text.
    let (summary_result, questions) = tokio::join!(
        generate_summary(chat, &text),
        generate_questions(
            chat,
            &text,
            PIPELINE_QUESTION_COUNT,
            DifficultyLevel::Medium
        ),
    );

    let (summary, topics) = match summary_result {
        SummaryResult::Parsed { summary, topics } => (summary, topics),
        SummaryResult::Failed { .. } => (SUMMARY_FAILED_SENTINEL.to_string(), Vec::new()),
    };

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        Document::store_processing_results(
            conn,
            document_id,
            &text,
            pages,
            &summary,
            &topics,
            Utc::now(),
        )?;

        // An empty batch still completes the run; a summary without a quiz
        // is more useful than no results at all.
        if !questions.is_empty() {
            let quiz = Quiz::create(
                conn,
                NewQuiz {
                    document_id,
                    title: quiz_title(&document.original_name),
                    description: Some(format!(
                        "Auto-generated quiz from {}",
                        document.original_name
                    )),
                    difficulty: DifficultyLevel::Medium.as_str().to_string(),
                    estimated_duration: Some(estimated_duration(questions.len())),
                },
            )?;
            let new_questions = to_new_questions(quiz.id, &questions);
            Question::create_batch(conn, &new_questions)?;
        }

        Ok(())
    })
    .map_err(|e| format!("persisting results failed: {}", e))?;

    Ok(RunOutcome::Completed)
}

/// The rolled-back in-memory document may be stale, so the row is re-fetched
/// fresh before the terminal transition.
fn mark_failed(document_id: Uuid) {
    let mut conn = match get_database_connection() {
        Ok(conn) => conn,
        Err(e) => {
            error!(document = %document_id, "cannot mark failed: {}", e);
            return;
        }
    };

    match Document::find(&mut conn, document_id) {
        Ok(document) if document.status().can_transition_to(ProcessingStatus::Failed) => {
            if let Err(e) = Document::set_status(&mut conn, document_id, ProcessingStatus::Failed) {
                error!(document = %document_id, "failed-state update error: {}", e);
            }
        }
        Ok(document) => {
            warn!(
                document = %document_id,
                status = %document.status(),
                "not marking failed from current status"
            );
        }
        Err(e) => {
            error!(document = %document_id, "lookup for failure marking failed: {}", e);
        }
    }
}

pub fn quiz_title(filename: &str) -> String {
    let truncated: String = filename.chars().take(50).collect();
    if filename.chars().count() > 50 {
        format!("Quiz: {}...", truncated)
    } else {
        format!("Quiz: {}", truncated)
    }
}

/// Two minutes per question, five minutes floor.
pub fn estimated_duration(question_count: usize) -> i32 {
    std::cmp::max(5, (question_count * 2) as i32)
}

pub fn to_new_questions(quiz_id: Uuid, generated: &[GeneratedQuestion]) -> Vec<NewQuestion> {
    generated
        .iter()
        .enumerate()
        .map(|(index, question)| NewQuestion {
            quiz_id,
            question_text: question.question.clone(),
            question_type: QuestionType::MultipleChoice.as_str().to_string(),
            options: Some(question.options.clone()),
            correct_answer: question.answer.clone(),
            explanation: question.explanation.clone(),
            order_index: index as i32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quiz_title_truncates_long_filenames() {
        let short = quiz_title("notes.pdf");
        assert_eq!(short, "Quiz: notes.pdf");

        let long_name = "a".repeat(80);
        let long = quiz_title(&long_name);
        assert_eq!(long, format!("Quiz: {}...", "a".repeat(50)));
    }

    #[test]
    fn test_estimated_duration_floor() {
        assert_eq!(estimated_duration(1), 5);
        assert_eq!(estimated_duration(2), 5);
        assert_eq!(estimated_duration(10), 20);
    }

    #[test]
    fn test_generated_questions_keep_order_index() {
        let quiz_id = Uuid::new_v4();
        let generated = vec![
            GeneratedQuestion {
                question: "first".to_string(),
                options: json!({"A": "1", "B": "2"}),
                answer: "A".to_string(),
                explanation: None,
            },
            GeneratedQuestion {
                question: "second".to_string(),
                options: json!({"A": "1", "B": "2"}),
                answer: "B".to_string(),
                explanation: Some("why".to_string()),
            },
        ];

        let new_questions = to_new_questions(quiz_id, &generated);
        assert_eq!(new_questions.len(), 2);
        assert_eq!(new_questions[0].order_index, 0);
        assert_eq!(new_questions[1].order_index, 1);
        assert_eq!(new_questions[1].correct_answer, "B");
        assert!(
            new_questions
                .iter()
                .all(|q| q.question_type == "multiple_choice")
        );
    }
}
