use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, ItemId, ServerError};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
    Guest,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: ItemId,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub role: UserRole,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.read().await.list())
}

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    let mut users = state.users.write().await;
    if users.values().any(|user| user.email == input.email) {
        return Err(ServerError::EmailTaken);
    }
    let user = users.insert_with(|id| User {
        id,
        name: input.name,
        email: input.email,
        is_active: input.is_active,
        role: input.role,
    });
    tracing::info!(id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<User>, ServerError> {
    let users = state.users.read().await;
    users.get(id).cloned().map(Json).ok_or(ServerError::NotFound("User"))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, ServerError> {
    let mut users = state.users.write().await;
    if users.get(id).is_none() {
        return Err(ServerError::NotFound("User"));
    }
    if let Some(email) = &input.email {
        if users
            .values()
            .any(|user| user.id != id && user.email == *email)
        {
            return Err(ServerError::EmailTaken);
        }
    }
    let user = users.get_mut(id).ok_or(ServerError::NotFound("User"))?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(is_active) = input.is_active {
        user.is_active = is_active;
    }
    if let Some(role) = input.role {
        user.role = role;
    }
    tracing::info!(id, "user updated");
    Ok(Json(user.clone()))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<StatusCode, ServerError> {
    let mut users = state.users.write().await;
    users.remove(id).ok_or(ServerError::NotFound("User"))?;
    tracing::info!(id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
