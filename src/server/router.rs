use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
    serve,
};
use tokio::fs;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::server::routes::assessment_router::{
    get_assessment_questions, get_assessment_result, submit_assessment,
};
use crate::server::routes::document_router::{
    delete_document, get_document, get_document_status, get_document_summary, list_documents,
    upload_document,
};
use crate::server::routes::quiz_router::{
    delete_quiz, generate_quiz, get_quiz, list_quiz_submissions, list_quizzes, submit_quiz,
};
use crate::server::serializers::AppState;
use crate::service::chat_client::ChatCompletion;
use crate::service::scheduler::Scheduler;

pub async fn run(config: &Config, scheduler: Scheduler, chat: Arc<dyn ChatCompletion>) {
    fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    let state = Arc::new(AppState {
        upload_dir: config.upload_dir.clone(),
        scheduler,
        chat,
        max_file_size: config.max_file_size,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { "Tutoring Backend API" }))
        .route("/documents/upload", post(upload_document))
        .route("/documents/", get(list_documents))
        .route("/documents/{id}", get(get_document).delete(delete_document))
        .route("/documents/{id}/status", get(get_document_status))
        .route("/documents/{id}/summary", get(get_document_summary))
        .route("/quizzes/generate", post(generate_quiz))
        .route("/quizzes/", get(list_quizzes))
        .route("/quizzes/{id}", get(get_quiz).delete(delete_quiz))
        .route("/quizzes/{id}/submit", post(submit_quiz))
        .route("/quizzes/{id}/submissions", get(list_quiz_submissions))
        .route("/assessment/questions", get(get_assessment_questions))
        .route("/assessment/submit", post(submit_assessment))
        .route("/assessment/result", get(get_assessment_result))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Multipart framing overhead on top of the raw file cap.
                .layer(RequestBodyLimitLayer::new(config.max_file_size + 64 * 1024))
                .layer(cors),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    serve(listener, app).await.expect("Server error");
}
