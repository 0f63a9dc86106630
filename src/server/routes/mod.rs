pub mod assessment_router;
pub mod document_router;
pub mod quiz_router;
