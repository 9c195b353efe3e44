use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::analytics::{self, ChartPoint};
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::checkin::{CheckIn, CreateCheckInRequest};
use crate::AppState;

/// Most recent N check-ins shown in the friend activity feed.
const FRIEND_FEED_LIMIT: i64 = 30;

/// A friend's check-in annotated with who logged it.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeedCheckIn {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub checkin: CheckIn,
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub series: Vec<ChartPoint>,
    pub goal_progress: Option<i64>,
}

pub async fn create_checkin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCheckInRequest>,
) -> AppResult<(StatusCode, Json<CheckIn>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Append-only: inserts never update, and no mutation routes exist.
    let checkin = sqlx::query_as::<_, CheckIn>(
        r#"
        INSERT INTO checkins (
            id, user_id, mood, energy, soreness, sleep_hours, sleep_quality,
            stress_level, recovery, hydration, nutrition_quality,
            workout_motivation, fitness_goal, notes, weight
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.mood)
    .bind(body.energy)
    .bind(body.soreness)
    .bind(body.sleep_hours)
    .bind(body.sleep_quality)
    .bind(body.stress_level)
    .bind(body.recovery)
    .bind(body.hydration)
    .bind(body.nutrition_quality)
    .bind(body.workout_motivation)
    .bind(body.fitness_goal)
    .bind(&body.notes)
    .bind(body.weight)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(user_id = %auth_user.id, checkin_id = %checkin.id, "Check-in recorded");

    Ok((StatusCode::CREATED, Json(checkin)))
}

pub async fn list_checkins(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<CheckIn>>> {
    let checkins = sqlx::query_as::<_, CheckIn>(
        r#"
        SELECT * FROM checkins
        WHERE user_id = $1
        ORDER BY timestamp DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(checkins))
}

/// Most recent check-ins across all of the caller's friends.
pub async fn list_friend_checkins(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<FeedCheckIn>>> {
    let feed = sqlx::query_as::<_, FeedCheckIn>(
        r#"
        SELECT c.*, u.username
        FROM checkins c
        JOIN friendships f ON f.friend_id = c.user_id
        JOIN users u ON u.id = c.user_id
        WHERE f.user_id = $1
        ORDER BY c.timestamp DESC
        LIMIT $2
        "#,
    )
    .bind(auth_user.id)
    .bind(FRIEND_FEED_LIMIT)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(feed))
}

/// Chart-ready series plus weight-goal progress for the caller.
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<AnalyticsResponse>> {
    let mut checkins = sqlx::query_as::<_, CheckIn>(
        r#"
        SELECT * FROM checkins
        WHERE user_id = $1
        ORDER BY timestamp DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    // Repository order is newest-first; charts want chronological.
    checkins.reverse();

    let weight_goal = sqlx::query_scalar::<_, Option<f64>>(
        "SELECT weight_goal FROM users WHERE id = $1",
    )
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?;

    let latest_weight = checkins.iter().rev().find_map(|c| c.weight);

    Ok(Json(AnalyticsResponse {
        series: analytics::project(&checkins),
        goal_progress: analytics::goal_progress(latest_weight, weight_goal),
    }))
}
