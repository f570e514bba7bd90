//! Typed client bindings for the todo and user REST resources.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the sdk fully deterministic and testable.
//!
//! # Design
//! - `ResourceClient<R>` is stateless and holds only `base_url`. One generic
//!   client serves every resource; `Todos` and `Users` are compile-time
//!   bindings declared in `resource`.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `QueryKey` names cacheable reads so a read cache can invalidate them.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod form;
pub mod generator;
pub mod http;
pub mod query_key;
pub mod resource;
pub mod types;

pub use client::{HealthClient, ResourceClient, TodoClient, UserClient};
pub use error::{ApiError, ValidationError};
pub use form::{CreateForm, TodoForm, UserForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query_key::QueryKey;
pub use resource::{Resource, Todos, Users};
pub use types::{
    CreateTodo, CreateUser, ItemId, Message, Todo, UpdateTodo, UpdateUser, User, UserRole,
};
