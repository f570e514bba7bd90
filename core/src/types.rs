//! Domain DTOs for the todo and user resources.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently,
//! so the sdk never depends on axum. Integration tests catch any drift between
//! the two crates.
//!
//! Update payloads are partial: every field is optional, and absent fields are
//! left out of the JSON entirely so the backend leaves them unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned identifier of an item.
pub type ItemId = i64;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: ItemId,
    pub title: String,
    pub completed: bool,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request payload for updating an existing todo.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.completed { 'x' } else { ' ' };
        write!(f, "[{mark}] #{} {}", self.id, self.title)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
    Guest,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Guest => "guest",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
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

/// Request payload for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub role: UserRole,
}

/// Request payload for updating an existing user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} <{}> {}", self.id, self.name, self.email, self.role)?;
        if !self.is_active {
            f.write_str(" (inactive)")?;
        }
        Ok(())
    }
}

/// Plain message body, returned by the health check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}
