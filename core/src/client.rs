//! Stateless HTTP request builder and response parser for the REST resources.
//!
//! # Design
//! `ResourceClient<R>` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping the
//! sdk deterministic and free of I/O dependencies.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resource::{Resource, Todos, Users};
use crate::types::{ItemId, Message};

/// Client for the todo resource.
pub type TodoClient = ResourceClient<Todos>;
/// Client for the user resource.
pub type UserClient = ResourceClient<Users>;

/// Synchronous, stateless client for one REST resource.
pub struct ResourceClient<R> {
    base_url: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("resource", &R::PATH)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            _resource: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, R::PATH)
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/{}/{id}", self.base_url, R::PATH)
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get(&self, id: ItemId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, input: &R::Create) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, self.collection_url(), input)
    }

    pub fn build_update(&self, id: ItemId, input: &R::Update) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Patch, self.item_url(id), input)
    }

    pub fn build_delete(&self, id: ItemId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<R::Item>, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<R::Item, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<R::Item, ApiError> {
        check_status(&response, &[201])?;
        decode(&response.body)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<R::Item, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    /// Backends differ on delete: some answer 204, some 200 with a message.
    /// Either counts as success and the body is ignored.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[204, 200])?;
        Ok(())
    }
}

/// Client for the service-level health check at `/`.
#[derive(Debug, Clone)]
pub struct HealthClient {
    base_url: String,
}

impl HealthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_health_check(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_health_check(&self, response: HttpResponse) -> Result<Message, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }
}

fn json_request<T: Serialize>(
    method: HttpMethod,
    url: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}
