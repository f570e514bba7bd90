use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod todos;
pub mod users;

pub use config::ServerConfig;
pub use error::ServerError;
pub use todos::{CreateTodo, Todo, UpdateTodo};
pub use users::{CreateUser, UpdateUser, User, UserRole};

pub type ItemId = i64;

/// In-memory rows of one resource, kept in id order. Ids start at 1 and are
/// never reused.
#[derive(Debug)]
pub struct Table<T> {
    rows: BTreeMap<ItemId, T>,
    next_id: ItemId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    pub fn insert_with(&mut self, build: impl FnOnce(ItemId) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub fn list(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn remove(&mut self, id: ItemId) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

pub type Db<T> = Arc<RwLock<Table<T>>>;

#[derive(Clone, Default)]
pub struct AppState {
    pub todos: Db<Todo>,
    pub users: Db<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Router with fresh, empty storage.
pub fn app() -> Router {
    router(AppState::default())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(todos::routes())
        .merge(users::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy admitting the configured browser origins. Origins that are not
/// valid header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve with the CORS policy from `config`.
pub async fn serve(listener: TcpListener, config: &ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app().layer(cors_layer(&config.cors_origins))).await
}

async fn health_check() -> Json<Message> {
    Json(Message {
        message: "API is running!".to_string(),
    })
}
