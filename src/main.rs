use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

mod config;
mod error;
mod handlers;
mod state;
mod store;

use state::AppState;
use store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting cohort-tools-api in {:?} mode", config.environment);

    let pool = store::manager::connect().await?;
    store::manager::migrate(&pool).await?;

    let app = app(AppState { store: Store::new(pool) });

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // Service endpoints
        .route("/", get(root))
        .route("/health", get(health))
        .route_service("/docs", ServeFile::new("views/docs.html"))
        // Resource routes
        .merge(cohort_routes())
        .merge(student_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cohort_routes() -> Router<AppState> {
    use handlers::cohorts;

    Router::new()
        .route("/api/cohorts", get(cohorts::list).post(cohorts::create))
        .route(
            "/api/cohorts/:cohortId",
            get(cohorts::get)
                .patch(cohorts::update)
                .delete(cohorts::delete),
        )
}

fn student_routes() -> Router<AppState> {
    use handlers::students;

    Router::new()
        .route("/api/students", get(students::list).post(students::create))
        // The static segment must be registered alongside the id route;
        // axum gives it priority over :studentId.
        .route("/api/students/cohort/:cohortId", get(students::list_by_cohort))
        .route(
            "/api/students/:studentId",
            get(students::get)
                .patch(students::update)
                .delete(students::delete),
        )
}

fn cors_layer() -> CorsLayer {
    let origins = &crate::config::config().security.cors_origins;
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Cohort Tools API",
        "version": version,
        "description": "CRUD backend for cohorts and students",
        "endpoints": {
            "docs": "/docs",
            "health": "/health",
            "cohorts": "/api/cohorts[/:cohortId]",
            "students": "/api/students[/:studentId]",
            "students_by_cohort": "/api/students/cohort/:cohortId",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
