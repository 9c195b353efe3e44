use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWeightGoalRequest {
    #[validate(range(min = 1.0, message = "weightGoal must be a positive number of pounds"))]
    pub weight_goal: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightGoalResponse {
    pub weight_goal: Option<f64>,
}

pub async fn get_weight_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<WeightGoalResponse>> {
    let weight_goal =
        sqlx::query_scalar::<_, Option<f64>>("SELECT weight_goal FROM users WHERE id = $1")
            .bind(auth_user.id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(WeightGoalResponse { weight_goal }))
}

pub async fn update_weight_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateWeightGoalRequest>,
) -> AppResult<Json<WeightGoalResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let weight_goal = sqlx::query_scalar::<_, Option<f64>>(
        r#"
        UPDATE users SET weight_goal = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING weight_goal
        "#,
    )
    .bind(auth_user.id)
    .bind(body.weight_goal)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(WeightGoalResponse { weight_goal }))
}
