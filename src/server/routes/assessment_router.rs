use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::db::{
    get_database_connection,
    models::{LearningAssessment, NewLearningAssessment},
};
use crate::server::auth::UserId;
use crate::server::errors::AppError;
use crate::server::serializers::{AssessmentResultResponse, AssessmentSubmissionRequest};
use crate::service::assessment::{assessment_questions, calculate_learning_style};

pub async fn get_assessment_questions() -> impl IntoResponse {
    Json(assessment_questions())
}

pub async fn submit_assessment(
    UserId(user_id): UserId,
    Json(request): Json<AssessmentSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.responses.is_empty() {
        return Err(AppError::BadRequest(
            "Assessment responses must not be empty".to_string(),
        ));
    }

    let scores = calculate_learning_style(&request.responses);

    let mut conn = get_database_connection()?;

    let assessment = LearningAssessment::create(
        &mut conn,
        NewLearningAssessment {
            user_id,
            assessment_data: serde_json::json!({ "responses": request.responses }),
            learning_style_result: scores.learning_style.to_string(),
            visual_score: scores.visual,
            auditory_score: scores.auditory,
            kinesthetic_score: scores.kinesthetic,
            reading_score: scores.reading,
        },
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AssessmentResultResponse::from(assessment)),
    ))
}

pub async fn get_assessment_result(
    UserId(user_id): UserId,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_database_connection()?;

    let assessment = LearningAssessment::find_latest_for_user(&mut conn, user_id)?.ok_or_else(
        || AppError::NotFoundError("No assessment found. Please take the assessment first.".to_string()),
    )?;

    Ok(Json(AssessmentResultResponse::from(assessment)))
}
