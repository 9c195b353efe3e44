use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::checkin::{CheckIn, CreateCheckInRequest};
use crate::services::coach::RECENT_HISTORY_LIMIT;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 500, message = "Question must be 1-500 characters"))]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendation: String,
}

async fn recent_checkins(state: &AppState, user_id: Uuid) -> AppResult<Vec<CheckIn>> {
    let checkins = sqlx::query_as::<_, CheckIn>(
        r#"
        SELECT * FROM checkins
        WHERE user_id = $1
        ORDER BY timestamp DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(RECENT_HISTORY_LIMIT as i64)
    .fetch_all(&state.db)
    .await?;

    Ok(checkins)
}

pub async fn get_analysis(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<AnalysisResponse>> {
    let checkins = recent_checkins(&state, auth_user.id).await?;
    let analysis = state.coach.analyze(&checkins).await;

    Ok(Json(AnalysisResponse { analysis }))
}

pub async fn post_question(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<QuestionRequest>,
) -> AppResult<Json<AnswerResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let checkins = recent_checkins(&state, auth_user.id).await?;
    let answer = state.coach.answer_question(&body.question, &checkins).await;

    Ok(Json(AnswerResponse { answer }))
}

/// Recommend a workout from the submitted current-state snapshot. The
/// snapshot is validated like a check-in but never persisted.
pub async fn post_workout(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCheckInRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let recommendation = state.coach.recommend_workout(&body).await;

    Ok(Json(RecommendationResponse { recommendation }))
}
