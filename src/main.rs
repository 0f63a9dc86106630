mod config;
mod db;
mod pdf;
mod server;
mod service;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::service::chat_client::{ChatClient, ChatCompletion};
use crate::service::processor::DocumentProcessor;
use crate::service::scheduler::Scheduler;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let chat: Arc<dyn ChatCompletion> =
        Arc::new(ChatClient::from_env().expect("Failed to build AI client"));

    let (scheduler, receiver) = Scheduler::new(config.queue_capacity);
    let processor =
        DocumentProcessor::new(receiver, chat.clone()).with_worker_count(config.worker_count);
    tokio::spawn(processor.start());

    server::run(&config, scheduler, chat).await;
}
