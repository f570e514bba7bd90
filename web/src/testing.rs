//! In-process transport for unit tests: requests go straight into the mock
//! server's router, no sockets involved.

use std::sync::{Arc, Mutex};

use acme_sdk::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use async_trait::async_trait;
use axum::body::Body;
use http_body_util::BodyExt;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use crate::transport::Transport;

pub(crate) struct RouterTransport {
    router: axum::Router,
    requests: Mutex<Vec<HttpRequest>>,
    fail_next: Mutex<Option<ApiError>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl RouterTransport {
    pub(crate) const BASE_URL: &'static str = "http://mock.test";

    pub(crate) fn new() -> Self {
        Self {
            router: mock_server::app(),
            requests: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            gate: Mutex::new(None),
        }
    }

    /// Every request seen so far, including failed ones.
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, method: HttpMethod) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|req| req.method == method)
            .count()
    }

    /// Fail the next request with `err` instead of dispatching it.
    pub(crate) fn fail_next(&self, err: ApiError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Hold every following request until the returned semaphore gets a
    /// permit. Requests pass one at a time after that.
    pub(crate) fn close_gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl Transport for RouterTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());

        let gate = self.gate.lock().unwrap().clone();
        let _permit = match &gate {
            Some(gate) => Some(gate.acquire().await.unwrap()),
            None => None,
        };

        let failure = self.fail_next.lock().unwrap().take();
        if let Some(err) = failure {
            return Err(err);
        }

        let mut builder = axum::http::Request::builder()
            .method(request.method.as_str())
            .uri(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let http_request = builder
            .body(Body::from(request.body.unwrap_or_default()))
            .unwrap();

        let response = self.router.clone().oneshot(http_request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        Ok(HttpResponse::new(
            status,
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    }
}
