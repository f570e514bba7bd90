//! Full CRUD lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP using ureq. Validates that request building and
//! response parsing work end-to-end with the actual server.

use acme_sdk::{
    ApiError, CreateTodo, CreateUser, HealthClient, HttpMethod, HttpRequest, HttpResponse,
    TodoClient, UpdateTodo, UpdateUser, UserClient, UserRole,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the sdk handle
/// status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.url).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.url).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.url).send_empty(),
        (HttpMethod::Patch, Some(body)) => agent
            .patch(&req.url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Patch, None) => agent.patch(&req.url).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse::new(status, body)
}

/// Start a mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn health_check() {
    let base = start_server();
    let health = HealthClient::new(&base);
    let msg = health
        .parse_health_check(execute(health.build_health_check()))
        .unwrap();
    assert_eq!(msg.message, "API is running!");
}

#[test]
fn todo_crud_lifecycle() {
    let client = TodoClient::new(&start_server());

    // list: empty
    let todos = client.parse_list(execute(client.build_list())).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // create: backend assigns id 1
    let create_input = CreateTodo {
        title: "Buy milk".to_string(),
        completed: false,
    };
    let req = client.build_create(&create_input).unwrap();
    let created = client.parse_create(execute(req)).unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.title, "Buy milk");
    assert!(!created.completed);
    let id = created.id;

    // get
    let fetched = client.parse_get(execute(client.build_get(id))).unwrap();
    assert_eq!(fetched, created);

    // toggle: only completed changes
    let req = client
        .build_update(
            id,
            &UpdateTodo {
                title: None,
                completed: Some(true),
            },
        )
        .unwrap();
    let updated = client.parse_update(execute(req)).unwrap();
    assert_eq!(updated.title, "Buy milk");
    assert!(updated.completed);

    // list: one item reflecting the toggle
    let todos = client.parse_list(execute(client.build_list())).unwrap();
    assert_eq!(todos, vec![updated]);

    // delete
    client.parse_delete(execute(client.build_delete(id))).unwrap();

    // get after delete: NotFound
    let err = client.parse_get(execute(client.build_get(id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // delete again: NotFound
    let err = client
        .parse_delete(execute(client.build_delete(id)))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // list: empty again
    let todos = client.parse_list(execute(client.build_list())).unwrap();
    assert!(todos.is_empty(), "expected empty list after delete");
}

#[test]
fn user_lifecycle_and_email_conflict() {
    let client = UserClient::new(&start_server());

    let input = CreateUser {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        is_active: true,
        role: UserRole::Admin,
    };
    let created = client
        .parse_create(execute(client.build_create(&input).unwrap()))
        .unwrap();
    assert_eq!(created.role, UserRole::Admin);

    let err = client
        .parse_create(execute(client.build_create(&input).unwrap()))
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Http {
            status: 400,
            detail: "Email already registered".to_string()
        }
    );

    let update = UpdateUser {
        role: Some(UserRole::Guest),
        ..UpdateUser::default()
    };
    let updated = client
        .parse_update(execute(client.build_update(created.id, &update).unwrap()))
        .unwrap();
    assert_eq!(updated.role, UserRole::Guest);
    assert_eq!(updated.email, "ada@example.com");

    client
        .parse_delete(execute(client.build_delete(created.id)))
        .unwrap();
    let users = client.parse_list(execute(client.build_list())).unwrap();
    assert!(users.is_empty());
}
