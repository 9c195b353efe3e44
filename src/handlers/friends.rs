use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::user::UserSummary;
use crate::AppState;

/// Queries shorter than this return an empty result instead of scanning.
const MIN_QUERY_LEN: usize = 2;
const MAX_SEARCH_RESULTS: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFriendRequest {
    pub friend_id: Uuid,
}

/// Case-insensitive substring search on username or email, excluding the
/// caller.
pub async fn search_users(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<UserSummary>>> {
    let query = params.query.unwrap_or_default();
    let query = query.trim();

    if query.chars().count() < MIN_QUERY_LEN {
        return Ok(Json(Vec::new()));
    }

    let pattern = format!("%{}%", query);
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, username, email FROM users
        WHERE id != $1 AND (username ILIKE $2 OR email ILIKE $2)
        ORDER BY username
        LIMIT $3
        "#,
    )
    .bind(auth_user.id)
    .bind(&pattern)
    .bind(MAX_SEARCH_RESULTS)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(users))
}

/// Insert the symmetric relation: both directed rows commit in one
/// transaction or neither does.
pub async fn add_friend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<AddFriendRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if body.friend_id == auth_user.id {
        return Err(AppError::Validation(
            "Cannot add yourself as a friend".into(),
        ));
    }

    let target_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(body.friend_id)
            .fetch_one(&state.db)
            .await?;

    if !target_exists {
        return Err(AppError::NotFound("User not found".into()));
    }

    let already = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2)",
    )
    .bind(auth_user.id)
    .bind(body.friend_id)
    .fetch_one(&state.db)
    .await?;

    if already {
        return Err(AppError::Duplicate("Already friends".into()));
    }

    let mut tx = state.db.begin().await?;

    sqlx::query("INSERT INTO friendships (user_id, friend_id) VALUES ($1, $2)")
        .bind(auth_user.id)
        .bind(body.friend_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO friendships (user_id, friend_id) VALUES ($1, $2)")
        .bind(body.friend_id)
        .bind(auth_user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = %auth_user.id, friend_id = %body.friend_id, "Friendship created");

    Ok(Json(json!({ "message": "Friend added successfully" })))
}

pub async fn list_friends(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<UserSummary>>> {
    let friends = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username, u.email
        FROM users u
        JOIN friendships f ON f.friend_id = u.id
        WHERE f.user_id = $1
        ORDER BY u.username
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(friends))
}
