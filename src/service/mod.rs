pub mod assessment;
pub mod chat_client;
pub mod processor;
pub mod quiz_generator;
pub mod scheduler;
pub mod scoring;
pub mod summarizer;
