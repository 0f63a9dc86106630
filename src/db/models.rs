use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema;
use schema::{documents, learning_assessments, questions, quiz_submissions, quizzes};

/// Lifecycle of an uploaded document. Moves forward only:
/// pending -> processing -> (processed | failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Processed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Processed => "processed",
            ProcessingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(ProcessingStatus::Pending),
            "processing" => Ok(ProcessingStatus::Processing),
            "processed" => Ok(ProcessingStatus::Processed),
            "failed" => Ok(ProcessingStatus::Failed),
            _ => Err(format!("Invalid processing status: {}", s)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Processed | ProcessingStatus::Failed)
    }

    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        matches!(
            (self, next),
            (ProcessingStatus::Pending, ProcessingStatus::Processing)
                | (ProcessingStatus::Processing, ProcessingStatus::Processed)
                | (ProcessingStatus::Processing, ProcessingStatus::Failed)
        )
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "easy" => Ok(DifficultyLevel::Easy),
            "medium" => Ok(DifficultyLevel::Medium),
            "hard" => Ok(DifficultyLevel::Hard),
            _ => Err(format!("Invalid difficulty level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
        }
    }
}

#[derive(Debug, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub file_hash: Option<String>,
    pub page_count: Option<i32>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub key_topics: Option<serde_json::Value>,
    pub tags: Option<serde_json::Value>,
    pub processing_status: String,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn status(&self) -> ProcessingStatus {
        ProcessingStatus::parse(&self.processing_status).unwrap_or(ProcessingStatus::Failed)
    }
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocument {
    pub user_id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub file_hash: Option<String>,
    pub processing_status: String,
}

#[derive(Debug, Queryable, Selectable, Serialize, Identifiable, Associations)]
#[diesel(belongs_to(Document))]
#[diesel(table_name = quizzes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Quiz {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub estimated_duration: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = quizzes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewQuiz {
    pub document_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub estimated_duration: Option<i32>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Identifiable, Associations)]
#[diesel(belongs_to(Quiz))]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_text: String,
    pub question_type: String,
    pub options: Option<serde_json::Value>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub order_index: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewQuestion {
    pub quiz_id: Uuid,
    pub question_text: String,
    pub question_type: String,
    pub options: Option<serde_json::Value>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub order_index: i32,
}

#[derive(Debug, Queryable, Selectable, Serialize, Identifiable, Associations)]
#[diesel(belongs_to(Quiz))]
#[diesel(table_name = quiz_submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QuizSubmission {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub answers: serde_json::Value,
    pub score: i32,
    pub time_spent: Option<i32>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = quiz_submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewQuizSubmission {
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub answers: serde_json::Value,
    pub score: i32,
    pub time_spent: Option<i32>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = learning_assessments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LearningAssessment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assessment_data: serde_json::Value,
    pub learning_style_result: String,
    pub visual_score: i32,
    pub auditory_score: i32,
    pub kinesthetic_score: i32,
    pub reading_score: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = learning_assessments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLearningAssessment {
    pub user_id: Uuid,
    pub assessment_data: serde_json::Value,
    pub learning_style_result: String,
    pub visual_score: i32,
    pub auditory_score: i32,
    pub kinesthetic_score: i32,
    pub reading_score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_forward_only() {
        use ProcessingStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Processed));
        assert!(Processing.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Processed));
        assert!(!Pending.can_transition_to(Failed));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Processed.can_transition_to(Processing));
        assert!(!Processed.can_transition_to(Pending));
        assert!(!Failed.can_transition_to(Pending));
        assert!(!Failed.can_transition_to(Processing));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ProcessingStatus::Pending.is_terminal());
        assert!(!ProcessingStatus::Processing.is_terminal());
        assert!(ProcessingStatus::Processed.is_terminal());
        assert!(ProcessingStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProcessingStatus::Pending,
            ProcessingStatus::Processing,
            ProcessingStatus::Processed,
            ProcessingStatus::Failed,
        ] {
            assert_eq!(ProcessingStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ProcessingStatus::parse("completed").is_err());
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(
            DifficultyLevel::parse("medium").unwrap(),
            DifficultyLevel::Medium
        );
        assert!(DifficultyLevel::parse("extreme").is_err());
    }
}
