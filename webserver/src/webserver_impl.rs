//! Main webserver implementation
//!
//! Owns the axum router. Every task route delegates to the injected
//! [`TaskApi`]; errors come back as `{"error": "..."}` with a status code
//! derived from the error kind.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::Method,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use shared::{CreateTaskRequest, DoneNotification, Task, TaskAck, TaskId, TaskList, TaskStatusResponse};

use crate::error::{WebServerError, WebServerResult};
use crate::state::{AppState, WebServerState};
use crate::traits::TaskApi;

/// Browsers may cache a preflight answer for a day
const CORS_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// HTTP front end over a task API implementation
pub struct WebServer<T: TaskApi + 'static> {
    state: AppState<T>,
}

impl<T: TaskApi + 'static> WebServer<T> {
    pub fn new(bind_address: SocketAddr, api: Arc<T>) -> Self {
        Self {
            state: AppState {
                api,
                server: Arc::new(WebServerState::new(bind_address)),
            },
        }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/task", post(create_task_handler::<T>).get(list_tasks_handler::<T>))
            .route(
                "/task/:id",
                get(task_status_handler::<T>).delete(delete_task_handler::<T>),
            )
            .route("/task/:id/abort", post(abort_task_handler::<T>))
            .route("/task/:id/done", post(worker_done_handler::<T>))
            .route("/task/:id/reconcile", post(reconcile_task_handler::<T>))
            .route("/health", get(health_check::<T>))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors_layer())
                    .into_inner(),
            )
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(&self) -> WebServerResult<()> {
        let address = self.state.server.bind_address;
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| WebServerError::Bind { address, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn serve(&self, listener: TcpListener) -> WebServerResult<()> {
        let router = self.build_router();
        if let Ok(local) = listener.local_addr() {
            tracing::info!("🌐 Task API listening on http://{}", local);
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("🛑 Task API stopped");
        Ok(())
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .max_age(CORS_MAX_AGE)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

fn decode<B>(payload: Result<Json<B>, JsonRejection>) -> WebServerResult<B> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| WebServerError::invalid_request(rejection.body_text()))
}

// HTTP Handlers

/// Create a task and start its fleet
async fn create_task_handler<T: TaskApi + 'static>(
    State(state): State<AppState<T>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> WebServerResult<Json<TaskAck>> {
    let request = decode(payload)?;
    tracing::debug!(
        "Create task: bucket '{}', population {}, {} instance(s)",
        request.bucket_name,
        request.population,
        request.num_instances
    );
    Ok(Json(state.api.create_task(request).await?))
}

async fn list_tasks_handler<T: TaskApi + 'static>(State(state): State<AppState<T>>) -> WebServerResult<Json<TaskList>> {
    Ok(Json(state.api.list_tasks().await?))
}

async fn task_status_handler<T: TaskApi + 'static>(
    State(state): State<AppState<T>>,
    Path(task_id): Path<TaskId>,
) -> WebServerResult<Json<TaskStatusResponse>> {
    Ok(Json(state.api.task_status(task_id).await?))
}

async fn abort_task_handler<T: TaskApi + 'static>(
    State(state): State<AppState<T>>,
    Path(task_id): Path<TaskId>,
) -> WebServerResult<Json<Task>> {
    Ok(Json(state.api.abort_task(task_id).await?))
}

async fn delete_task_handler<T: TaskApi + 'static>(
    State(state): State<AppState<T>>,
    Path(task_id): Path<TaskId>,
) -> WebServerResult<Json<TaskAck>> {
    Ok(Json(state.api.delete_task(task_id).await?))
}

/// Worker completion (or failure) ping
async fn worker_done_handler<T: TaskApi + 'static>(
    State(state): State<AppState<T>>,
    Path(task_id): Path<TaskId>,
    payload: Result<Json<DoneNotification>, JsonRejection>,
) -> WebServerResult<Json<TaskAck>> {
    let notification = decode(payload)?;
    if notification.task_id != task_id {
        return Err(WebServerError::invalid_request(format!(
            "task id '{}' in body does not match '{}' in path",
            notification.task_id, task_id
        )));
    }
    Ok(Json(state.api.worker_done(notification).await?))
}

async fn reconcile_task_handler<T: TaskApi + 'static>(
    State(state): State<AppState<T>>,
    Path(task_id): Path<TaskId>,
) -> WebServerResult<Json<Task>> {
    Ok(Json(state.api.reconcile_task(task_id).await?))
}

/// Health check endpoint
async fn health_check<T: TaskApi + 'static>(State(state): State<AppState<T>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime": state.server.get_uptime_seconds(),
    }))
}
