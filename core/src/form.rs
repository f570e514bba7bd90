//! Create-form state and client-side validation.
//!
//! A form only checks that required fields are filled in. Anything deeper
//! (email format, uniqueness) is the backend's call.

use crate::error::ValidationError;
use crate::resource::{Resource, Todos, Users};
use crate::types::{CreateTodo, CreateUser, UserRole};

/// Local input state that turns into a create payload for `R`.
pub trait CreateForm<R: Resource>: Default + Clone + Send + Sync {
    /// Build the payload, or report the first required field left empty.
    fn validate(&self) -> Result<R::Create, ValidationError>;

    /// Reset every field to its default.
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Trimmed `value`, or an error naming `field` when nothing is left.
fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError { field });
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
}

impl TodoForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl CreateForm<Todos> for TodoForm {
    fn validate(&self) -> Result<CreateTodo, ValidationError> {
        Ok(CreateTodo {
            title: required("title", &self.title)?,
            completed: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: UserRole::User,
            is_active: true,
        }
    }
}

impl CreateForm<Users> for UserForm {
    fn validate(&self) -> Result<CreateUser, ValidationError> {
        Ok(CreateUser {
            name: required("name", &self.name)?,
            email: required("email", &self.email)?,
            is_active: self.is_active,
            role: self.role,
        })
    }
}
