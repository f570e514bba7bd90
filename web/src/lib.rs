//! List views over the todo and user resources.
//!
//! # Overview
//! A `ListController` shows one resource collection and submits creates,
//! updates and deletes against it. Writes never patch the displayed list;
//! each successful write invalidates the collection in the shared
//! `QueryClient`, and the next read refetches from the backend.
//!
//! # Design
//! - Request building and parsing live in `acme_sdk`; this crate supplies
//!   the I/O through the `Transport` trait.
//! - `view` turns a controller snapshot into text, which the `acme` binary
//!   prints after every command.

pub mod cache;
pub mod cli;
pub mod config;
pub mod controller;
pub mod logging;
pub mod transport;
pub mod view;

#[cfg(test)]
mod testing;

pub use cache::QueryClient;
pub use config::{AppConfig, ConfigError};
pub use controller::{Control, ListController, Submission, TodoListController, UserListController};
pub use transport::{ReqwestTransport, Transport};
pub use view::{ListView, Presentation};
