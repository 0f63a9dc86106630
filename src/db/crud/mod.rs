pub mod crud_assessments;
pub mod crud_documents;
pub mod crud_questions;
pub mod crud_quizzes;
pub mod crud_submissions;
