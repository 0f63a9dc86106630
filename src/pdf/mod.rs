pub mod pdf_extractor;

pub use pdf_extractor::extract_document_text;
