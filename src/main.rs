use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod analytics;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;
use services::coach::CoachService;
use services::textgen::AnthropicClient;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
    pub coach: Arc<CoachService>,
}

/// Routes behind bearer auth. Check-ins expose create and read only;
/// there are no update or delete routes.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(handlers::auth::profile))
        // Check-ins
        .route("/api/checkin", post(handlers::checkins::create_checkin))
        .route("/api/checkins", get(handlers::checkins::list_checkins))
        .route("/api/analytics", get(handlers::checkins::get_analytics))
        // Weight goal
        .route("/api/weight-goal", get(handlers::goals::get_weight_goal))
        .route("/api/weight-goal", put(handlers::goals::update_weight_goal))
        // Friends
        .route("/api/users/search", get(handlers::friends::search_users))
        .route("/api/friends", get(handlers::friends::list_friends))
        .route("/api/friends/add", post(handlers::friends::add_friend))
        .route(
            "/api/friends/checkins",
            get(handlers::checkins::list_friend_checkins),
        )
        // AI coaching
        .route("/api/ai/analysis", get(handlers::ai::get_analysis))
        .route("/api/ai/question", post(handlers::ai::post_question))
        .route("/api/ai/workout", post(handlers::ai::post_workout))
}

fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/register", post(handlers::auth::register))
        .route("/api/login", post(handlers::auth::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected = protected_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        auth::middleware::require_auth,
    ));

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![state
            .config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .unwrap()];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitcoach_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let config = Arc::new(config);

    // Database
    let db = db::create_pool(&config.database_url).await;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let generator =
        AnthropicClient::new(&config).expect("Failed to build text-generation client");
    let coach = Arc::new(CoachService::new(Arc::new(generator)));

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter: RateLimitState::new(),
        coach,
    };

    let app = app(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    // Use into_make_service_with_connect_info to provide client IP for rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::connect_info::ConnectInfo;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use tower::util::ServiceExt;

    fn test_config() -> Config {
        Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://postgres@localhost/fitcoach_test".into()),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            jwt_secret: "test-secret".into(),
            jwt_ttl_secs: 3600,
            anthropic_api_key: String::new(),
            anthropic_model: "test-model".into(),
            ai_timeout_secs: 5,
        }
    }

    /// State with a lazy pool: no connection is made until a query runs, so
    /// routing-level tests work without a database.
    fn test_state() -> AppState {
        let config = test_config();
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        let generator = AnthropicClient::new(&config).expect("client");

        AppState {
            db,
            config: Arc::new(config),
            rate_limiter: RateLimitState::new(),
            coach: Arc::new(CoachService::new(Arc::new(generator))),
        }
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9999))));

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app(test_state());
        let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "fitcoach-api");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = app(test_state());

        for uri in [
            "/api/profile",
            "/api/checkins",
            "/api/analytics",
            "/api/friends",
            "/api/ai/analysis",
        ] {
            let (status, _) = send(&app, request(Method::GET, uri, None, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} should require auth", uri);
        }
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let app = app(test_state());
        let (status, _) = send(
            &app,
            request(Method::GET, "/api/checkins", Some("not-a-jwt"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_checkin_surface_is_append_only() {
        // Route table alone: check-ins expose POST (create) and GET (list)
        // and nothing that can mutate an existing record.
        let app = protected_routes().with_state(test_state());

        let cases = [
            (Method::PUT, "/api/checkin", StatusCode::METHOD_NOT_ALLOWED),
            (Method::DELETE, "/api/checkin", StatusCode::METHOD_NOT_ALLOWED),
            (Method::PUT, "/api/checkins", StatusCode::METHOD_NOT_ALLOWED),
            (Method::DELETE, "/api/checkins", StatusCode::METHOD_NOT_ALLOWED),
            (Method::DELETE, "/api/checkins/some-id", StatusCode::NOT_FOUND),
        ];

        for (method, uri, expected) in cases {
            let (status, _) = send(&app, request(method.clone(), uri, None, None)).await;
            assert_eq!(status, expected, "{} {} should not exist", method, uri);
        }
    }

    // ------------------------------------------------------------------
    // Database round-trips. Run with a live Postgres:
    //   DATABASE_URL=postgres://... cargo test -- --ignored
    // ------------------------------------------------------------------

    async fn db_app() -> (Router, AppState) {
        let state = test_state();
        sqlx::migrate!("./migrations")
            .run(&state.db)
            .await
            .expect("migrations");
        (app(state.clone()), state)
    }

    async fn register(app: &Router, username: &str, email: &str) -> (String, Value) {
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/register",
                None,
                Some(json!({
                    "username": username,
                    "email": email,
                    "password": "hunter2hunter2",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (body["token"].as_str().unwrap().to_string(), body["user"].clone())
    }

    fn unique() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a live Postgres"]
    async fn test_register_login_checkin_round_trip() {
        let (app, _state) = db_app().await;
        let s = unique();
        let email = format!("trainee{}@example.com", s);
        let (token, user) = register(&app, &format!("trainee{}", s), &email).await;
        assert!(user["id"].is_string());

        // Duplicate registration is rejected
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/register",
                None,
                Some(json!({
                    "username": format!("trainee{}", s),
                    "email": email,
                    "password": "hunter2hunter2",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Login works and bad password does not
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "email": email, "password": "hunter2hunter2" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "email": email, "password": "wrong-password" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Create a fully-populated check-in and read it back
        let before = chrono::Utc::now();
        let (status, created) = send(
            &app,
            request(
                Method::POST,
                "/api/checkin",
                Some(&token),
                Some(json!({
                    "mood": "Good",
                    "energy": 8,
                    "soreness": 2,
                    "sleepHours": 7.5,
                    "sleepQuality": "Fair",
                    "stressLevel": 3,
                    "recovery": "Mostly Recovered",
                    "hydration": 6,
                    "nutritionQuality": "Good",
                    "workoutMotivation": 9,
                    "fitnessGoal": "Strength",
                    "notes": "Morning run felt great",
                    "weight": 165.0,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, listed) = send(&app, request(Method::GET, "/api/checkins", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        let record = &listed[0];
        assert_eq!(record["id"], created["id"]);
        assert_eq!(record["mood"], "Good");
        assert_eq!(record["energy"], 8);
        assert_eq!(record["sleepHours"], 7.5);
        assert_eq!(record["recovery"], "Mostly Recovered");
        assert_eq!(record["nutritionQuality"], "Good");
        assert_eq!(record["notes"], "Morning run felt great");

        let ts: chrono::DateTime<chrono::Utc> =
            serde_json::from_value(record["timestamp"].clone()).unwrap();
        assert!(ts >= before - chrono::Duration::seconds(1));

        // Invalid payloads are rejected before storage
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/checkin",
                Some(&token),
                Some(json!({ "mood": "Good", "energy": 11, "soreness": 2 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a live Postgres"]
    async fn test_friend_graph_symmetry_and_feed() {
        let (app, _state) = db_app().await;
        let s = unique();
        let (token_a, user_a) = register(
            &app,
            &format!("ALPHA{}", s),
            &format!("alpha{}@example.com", s),
        )
        .await;
        let (token_b, user_b) = register(
            &app,
            &format!("BRAVO{}", s),
            &format!("bravo{}@example.com", s),
        )
        .await;

        // Below-minimum query returns nothing
        let (status, results) = send(
            &app,
            request(Method::GET, "/api/users/search?query=a", Some(&token_a), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(results.as_array().unwrap().is_empty());

        // Lowercase query matches the uppercase username and the email
        let (_, results) = send(
            &app,
            request(
                Method::GET,
                &format!("/api/users/search?query=bravo{}", &s[..12]),
                Some(&token_a),
                None,
            ),
        )
        .await;
        let results = results.as_array().unwrap().clone();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], user_b["id"]);

        // Self-friendship is rejected
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/friends/add",
                Some(&token_a),
                Some(json!({ "friendId": user_a["id"] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Adding B to A appears in both friend lists
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/friends/add",
                Some(&token_a),
                Some(json!({ "friendId": user_b["id"] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, friends_of_a) = send(&app, request(Method::GET, "/api/friends", Some(&token_a), None)).await;
        let (_, friends_of_b) = send(&app, request(Method::GET, "/api/friends", Some(&token_b), None)).await;
        assert!(friends_of_a
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["id"] == user_b["id"]));
        assert!(friends_of_b
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["id"] == user_a["id"]));

        // Re-adding in either direction fails and changes nothing
        for (token, target) in [(&token_a, &user_b), (&token_b, &user_a)] {
            let (status, _) = send(
                &app,
                request(
                    Method::POST,
                    "/api/friends/add",
                    Some(token),
                    Some(json!({ "friendId": target["id"] })),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        let (_, friends_after) = send(&app, request(Method::GET, "/api/friends", Some(&token_a), None)).await;
        assert_eq!(friends_after.as_array().unwrap().len(), friends_of_a.as_array().unwrap().len());

        // B's check-in shows up in A's friend feed with attribution
        let (_, _) = send(
            &app,
            request(
                Method::POST,
                "/api/checkin",
                Some(&token_b),
                Some(json!({ "mood": "Okay", "energy": 5, "soreness": 5 })),
            ),
        )
        .await;
        let (status, feed) = send(
            &app,
            request(Method::GET, "/api/friends/checkins", Some(&token_a), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let feed = feed.as_array().unwrap();
        assert!(!feed.is_empty());
        assert_eq!(feed[0]["username"], user_b["username"]);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a live Postgres"]
    async fn test_weight_goal_and_analytics() {
        let (app, _state) = db_app().await;
        let s = unique();
        let (token, _) = register(
            &app,
            &format!("lifter{}", s),
            &format!("lifter{}@example.com", s),
        )
        .await;

        // Goal unset at first
        let (_, body) = send(&app, request(Method::GET, "/api/weight-goal", Some(&token), None)).await;
        assert!(body["weightGoal"].is_null());

        // Non-positive goal rejected
        let (status, _) = send(
            &app,
            request(
                Method::PUT,
                "/api/weight-goal",
                Some(&token),
                Some(json!({ "weightGoal": -10.0 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            request(
                Method::PUT,
                "/api/weight-goal",
                Some(&token),
                Some(json!({ "weightGoal": 150.0 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weightGoal"], 150.0);

        let (_, _) = send(
            &app,
            request(
                Method::POST,
                "/api/checkin",
                Some(&token),
                Some(json!({ "mood": "Good", "energy": 7, "soreness": 3, "weight": 165.0 })),
            ),
        )
        .await;

        let (status, body) = send(&app, request(Method::GET, "/api/analytics", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        // Past-goal progress stays unclamped
        assert_eq!(body["goalProgress"], 110);
        let series = body["series"].as_array().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["moodValue"], 4);
        assert!(series[0]["sleepHours"].is_null());
    }
}
