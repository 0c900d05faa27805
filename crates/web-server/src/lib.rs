use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put, MethodRouter},
    Json, Router,
};
use configuration::{AppEnvironment, Settings};
use database::{DbRepository, GradeRepository};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;

use error::{ErrorDetail, INTERNAL_ERROR_MESSAGE};
use response::ApiResponse;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn GradeRepository>,
    pub environment: AppEnvironment,
}

impl AppState {
    pub fn new(repo: Arc<dyn GradeRepository>, environment: AppEnvironment) -> Self {
        Self { repo, environment }
    }
}

/// Builds the full router: API routes under `/api`, `/health`, the JSON 404
/// fallback and the middleware stack.
///
/// A path that exists but is requested with the wrong method gets the same
/// JSON 404 as an unknown path.
pub fn build_router(state: AppState) -> Router {
    let environment = state.environment;
    let app_state = Arc::new(state);

    Router::new()
        .route("/api", api_route(get(handlers::api_index)))
        .route("/api/", api_route(get(handlers::api_index)))
        .route("/api/notas", api_route(get(handlers::list_grades)))
        .route("/api/notas/inserir", api_route(post(handlers::create_grade)))
        .route("/api/notas/:name", api_route(get(handlers::get_grade)))
        .route("/api/editar/:name", api_route(put(handlers::update_grade)))
        .route("/api/excluir/:name", api_route(delete(handlers::delete_grade)))
        .route("/health", api_route(get(handlers::health)))
        .fallback(handlers::route_not_found)
        .with_state(app_state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::map_response_with_state(environment, expose_error_details))
        .layer(CorsLayer::permissive())
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

fn api_route(method_router: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    method_router.fallback(handlers::route_not_found)
}

/// Turns a handler panic into the standard 500 envelope.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked.");

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::failure(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response();
    response.extensions_mut().insert(ErrorDetail {
        message: INTERNAL_ERROR_MESSAGE.to_string(),
        detail,
    });
    response
}

/// Outside production, rewrites 500 responses to carry the internal error text.
async fn expose_error_details(
    State(environment): State<AppEnvironment>,
    response: Response,
) -> Response {
    if !environment.exposes_error_details() {
        return response;
    }
    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail { message, detail }) => (
            response.status(),
            Json(ApiResponse::failure(message).with_error(detail)),
        )
            .into_response(),
        None => response,
    }
}

/// Connects to the database, runs migrations and serves the API until ctrl-c.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let db_pool = database::connect(&settings.database).await?;
    database::run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let app_state = AppState::new(Arc::new(db_repo.clone()), settings.environment);
    let app = build_router(app_state);

    let addr = settings.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = settings.environment.as_str(),
        "Web server started. API at http://{}/api, health check at http://{}/health",
        addr,
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_repo.close().await;
    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        // Without a signal handler the server would never stop; keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received.");
}
