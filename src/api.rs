use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::db::{StoreError, TodoStore};
use crate::error::ApiError;
use crate::models::{parse_id, parse_title, parse_toggle, Todo};
use crate::ui;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new<S: TodoStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Runs a store call on the blocking pool; SQLite access is synchronous.
    async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn TodoStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|err| ApiError::Storage(format!("store task failed: {err}")))?
            .map_err(ApiError::from)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/health", get(health))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/:id", patch(rename_todo).delete(delete_todo))
        .route("/api/todos/:id/toggle", patch(toggle_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

async fn create_todo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let title = parse_title(&body)?;
    let todo = state.with_store(move |store| store.insert(&title)).await?;
    tracing::info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.with_store(|store| store.list()).await?;
    tracing::debug!(count = todos.len(), "listed todos");
    Ok(Json(todos))
}

async fn rename_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let title = parse_title(&body)?;
    let id = parse_id(&id)?;
    let todo = state
        .with_store(move |store| store.rename(id, &title))
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(id, "renamed todo");
    Ok(Json(todo))
}

async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let is_done = parse_toggle(&body)?;
    let id = parse_id(&id)?;
    let todo = state
        .with_store(move |store| store.set_done(id, is_done))
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(id, is_done, "toggled todo");
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let todo = state
        .with_store(move |store| store.delete(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(id, "deleted todo");
    Ok(Json(todo))
}
