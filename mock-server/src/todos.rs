use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, ItemId, ServerError};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: ItemId,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
}

async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    Json(state.todos.read().await.list())
}

async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> (StatusCode, Json<Todo>) {
    let todo = state.todos.write().await.insert_with(|id| Todo {
        id,
        title: input.title,
        completed: input.completed,
    });
    tracing::info!(id = todo.id, "todo created");
    (StatusCode::CREATED, Json(todo))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<Todo>, ServerError> {
    let todos = state.todos.read().await;
    todos.get(id).cloned().map(Json).ok_or(ServerError::NotFound("Todo"))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, ServerError> {
    let mut todos = state.todos.write().await;
    let todo = todos.get_mut(id).ok_or(ServerError::NotFound("Todo"))?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    tracing::info!(id, "todo updated");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<StatusCode, ServerError> {
    let mut todos = state.todos.write().await;
    todos.remove(id).ok_or(ServerError::NotFound("Todo"))?;
    tracing::info!(id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}
