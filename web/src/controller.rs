//! List-view controller: one resource collection plus the writes against it.
//!
//! # Design
//! The controller never edits the collection itself. Reads go through the
//! shared `QueryClient` under the resource's list key; every successful write
//! invalidates that key before returning, so the next `load_collection` hits
//! the backend.
//!
//! Methods take `&self`, so several writes can be in flight at once. Each one
//! marks only its own `Control` as pending.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use acme_sdk::{
    ApiError, CreateForm, ItemId, QueryKey, Resource, ResourceClient, Todo, TodoForm, Todos,
    UpdateTodo, UserForm, Users,
};
use tokio::sync::broadcast::error::RecvError;

use crate::cache::QueryClient;
use crate::transport::Transport;
use crate::view::ListView;

pub type TodoListController<T> = ListController<Todos, TodoForm, T>;
pub type UserListController<T> = ListController<Users, UserForm, T>;

/// The UI control that started a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Create,
    Update(ItemId),
    Delete(ItemId),
}

/// How a write submission ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The backend accepted the write and the list was invalidated.
    Done,
    /// A required form field was empty. Nothing was sent.
    Invalid,
    /// The same control already has a write in flight. Nothing was sent.
    Busy,
}

struct ControllerState<F> {
    form: F,
    loading: bool,
    error: Option<String>,
    pending: HashSet<Control>,
}

/// Clears a control's pending mark when the write finishes or is dropped.
struct PendingGuard<'a, F> {
    state: &'a Mutex<ControllerState<F>>,
    control: Control,
}

impl<F> Drop for PendingGuard<'_, F> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .remove(&self.control);
    }
}

pub struct ListController<R: Resource, F, T> {
    client: ResourceClient<R>,
    transport: Arc<T>,
    queries: QueryClient,
    state: Mutex<ControllerState<F>>,
}

impl<R, F, T> ListController<R, F, T>
where
    R: Resource,
    F: CreateForm<R>,
    T: Transport,
{
    pub fn new(client: ResourceClient<R>, transport: Arc<T>, queries: QueryClient) -> Self {
        Self {
            client,
            transport,
            queries,
            state: Mutex::new(ControllerState {
                form: F::default(),
                loading: false,
                error: None,
                pending: HashSet::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState<F>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache key of the collection this controller shows.
    pub fn key(&self) -> QueryKey {
        QueryKey::list::<R>()
    }

    pub fn form(&self) -> F {
        self.state().form.clone()
    }

    pub fn set_form(&self, form: F) {
        self.state().form = form;
    }

    pub fn edit_form(&self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.state().form);
    }

    pub fn is_pending(&self, control: Control) -> bool {
        self.state().pending.contains(&control)
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn dismiss_error(&self) {
        self.state().error = None;
    }

    /// Current view: the last loaded collection plus loading and error state.
    pub fn snapshot(&self) -> ListView<R> {
        let cached = self.queries.cached::<Vec<R::Item>>(&self.key());
        let loaded = cached.is_some();
        let items = cached
            .map(|items| items.as_ref().clone())
            .unwrap_or_default();
        let state = self.state();
        ListView {
            items,
            loaded,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    fn report(&self, control: Option<Control>, err: &ApiError) {
        match control {
            Some(control) => tracing::warn!(resource = R::NAME, ?control, error = %err, "write failed"),
            None => tracing::warn!(resource = R::NAME, error = %err, "load failed"),
        }
        self.state().error = Some(err.to_string());
    }

    /// Mark `control` pending, or return `None` if it already is.
    fn begin(&self, control: Control) -> Option<PendingGuard<'_, F>> {
        if !self.state().pending.insert(control) {
            tracing::debug!(resource = R::NAME, ?control, "control busy");
            return None;
        }
        Some(PendingGuard {
            state: &self.state,
            control,
        })
    }

    /// Invalidation happens before the write returns.
    fn committed(&self, control: Control) -> Submission {
        self.queries.invalidate(&self.key());
        self.state().error = None;
        tracing::info!(resource = R::NAME, ?control, "write committed");
        Submission::Done
    }

    async fn fetch_list(&self) -> Result<Vec<R::Item>, ApiError> {
        let response = self.transport.execute(self.client.build_list()).await?;
        self.client.parse_list(response)
    }

    /// Read the collection, from cache when fresh. On failure the error is
    /// recorded for display and the previously loaded list stays visible.
    pub async fn load_collection(&self) -> Result<Arc<Vec<R::Item>>, ApiError> {
        {
            let mut state = self.state();
            state.loading = self.queries.cached::<Vec<R::Item>>(&self.key()).is_none();
        }
        let result = self
            .queries
            .fetch_query(&self.key(), || self.fetch_list())
            .await;
        self.state().loading = false;
        match &result {
            Ok(_) => self.state().error = None,
            Err(err) => self.report(None, err),
        }
        result
    }

    /// Validate the form and create an item from it. An invalid form is a
    /// silent no-op. On success the form is cleared; on failure it is kept.
    pub async fn submit_create(&self) -> Result<Submission, ApiError> {
        let validated = self.state().form.validate();
        let input = match validated {
            Ok(input) => input,
            Err(err) => {
                tracing::debug!(resource = R::NAME, field = err.field, "create skipped");
                return Ok(Submission::Invalid);
            }
        };
        let Some(_pending) = self.begin(Control::Create) else {
            return Ok(Submission::Busy);
        };

        match self.create(&input).await {
            Ok(item) => {
                tracing::debug!(resource = R::NAME, id = R::id(&item), "created");
                self.state().form.clear();
                Ok(self.committed(Control::Create))
            }
            Err(err) => {
                self.report(Some(Control::Create), &err);
                Err(err)
            }
        }
    }

    async fn create(&self, input: &R::Create) -> Result<R::Item, ApiError> {
        let request = self.client.build_create(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create(response)
    }

    /// Apply a partial update to item `id`.
    pub async fn submit_update(&self, id: ItemId, update: R::Update) -> Result<Submission, ApiError> {
        let control = Control::Update(id);
        let Some(_pending) = self.begin(control) else {
            return Ok(Submission::Busy);
        };

        let result = async {
            let request = self.client.build_update(id, &update)?;
            let response = self.transport.execute(request).await?;
            self.client.parse_update(response)
        }
        .await;

        match result {
            Ok(_) => Ok(self.committed(control)),
            Err(err) => {
                self.report(Some(control), &err);
                Err(err)
            }
        }
    }

    pub async fn submit_delete(&self, id: ItemId) -> Result<Submission, ApiError> {
        let control = Control::Delete(id);
        let Some(_pending) = self.begin(control) else {
            return Ok(Submission::Busy);
        };

        let result = async {
            let response = self.transport.execute(self.client.build_delete(id)).await?;
            self.client.parse_delete(response)
        }
        .await;

        match result {
            Ok(()) => Ok(self.committed(control)),
            Err(err) => {
                self.report(Some(control), &err);
                Err(err)
            }
        }
    }

    /// Reload the collection each time its key is invalidated, by this
    /// controller or any other sharing the same `QueryClient`. Runs until the
    /// returned future is dropped.
    pub async fn refetch_on_invalidation(&self) {
        let key = self.key();
        let mut events = self.queries.subscribe();
        loop {
            match events.recv().await {
                Ok(invalidated) if invalidated == key => {
                    let _ = self.load_collection().await;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(resource = R::NAME, skipped, "invalidation events lagged");
                    let _ = self.load_collection().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

impl<F, T> ListController<Todos, F, T>
where
    F: CreateForm<Todos>,
    T: Transport,
{
    /// Flip `completed` and nothing else.
    pub async fn submit_toggle(&self, todo: &Todo) -> Result<Submission, ApiError> {
        let update = UpdateTodo {
            title: None,
            completed: Some(!todo.completed),
        };
        self.submit_update(todo.id, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RouterTransport;
    use acme_sdk::{HttpMethod, TodoClient, UpdateUser, UserClient, UserRole};
    use std::time::Duration;

    fn todos(transport: &Arc<RouterTransport>) -> TodoListController<RouterTransport> {
        ListController::new(
            TodoClient::new(RouterTransport::BASE_URL),
            transport.clone(),
            QueryClient::new(),
        )
    }

    fn users(transport: &Arc<RouterTransport>) -> UserListController<RouterTransport> {
        ListController::new(
            UserClient::new(RouterTransport::BASE_URL),
            transport.clone(),
            QueryClient::new(),
        )
    }

    #[tokio::test]
    async fn empty_collection_renders_empty_state() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);

        let items = controller.load_collection().await.unwrap();
        assert!(items.is_empty());
        let view = controller.snapshot();
        assert!(view.is_empty());
        assert!(view.render().contains("No tasks yet. Add one above!"));
    }

    #[tokio::test]
    async fn create_toggle_delete_scenario() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.load_collection().await.unwrap();

        controller.set_form(TodoForm::new("Buy milk"));
        assert_eq!(controller.submit_create().await.unwrap(), Submission::Done);
        assert_eq!(controller.form(), TodoForm::default());
        let items = controller.load_collection().await.unwrap();
        assert_eq!(
            *items,
            vec![Todo {
                id: 1,
                title: "Buy milk".to_string(),
                completed: false
            }]
        );

        assert_eq!(
            controller.submit_toggle(&items[0]).await.unwrap(),
            Submission::Done
        );
        let items = controller.load_collection().await.unwrap();
        assert_eq!(
            *items,
            vec![Todo {
                id: 1,
                title: "Buy milk".to_string(),
                completed: true
            }]
        );

        assert_eq!(controller.submit_delete(1).await.unwrap(), Submission::Done);
        let items = controller.load_collection().await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn toggle_sends_only_completed() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.set_form(TodoForm::new("Walk dog"));
        controller.submit_create().await.unwrap();
        let items = controller.load_collection().await.unwrap();

        controller.submit_toggle(&items[0]).await.unwrap();

        let patch = transport
            .requests()
            .into_iter()
            .find(|req| req.method == HttpMethod::Patch)
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(patch.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "completed": true }));

        let items = controller.load_collection().await.unwrap();
        assert_eq!(items[0].title, "Walk dog");
        assert!(items[0].completed);
    }

    #[tokio::test]
    async fn invalid_form_issues_no_request() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.load_collection().await.unwrap();
        let sent = transport.requests().len();

        controller.set_form(TodoForm::new("   "));
        assert_eq!(controller.submit_create().await.unwrap(), Submission::Invalid);

        assert_eq!(transport.requests().len(), sent);
        assert!(controller.error().is_none());
        assert_eq!(controller.form(), TodoForm::new("   "));
        assert!(controller.load_collection().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_write_invalidates_before_returning() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.load_collection().await.unwrap();
        assert!(controller.queries.is_fresh(&controller.key()));

        controller.set_form(TodoForm::new("Buy milk"));
        controller.submit_create().await.unwrap();
        assert!(!controller.queries.is_fresh(&controller.key()));
    }

    #[tokio::test]
    async fn fresh_reads_are_served_from_cache() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.load_collection().await.unwrap();
        controller.load_collection().await.unwrap();
        assert_eq!(transport.count(HttpMethod::Get), 1);
    }

    #[tokio::test]
    async fn read_failure_reports_error_and_keeps_list() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.set_form(TodoForm::new("Buy milk"));
        controller.submit_create().await.unwrap();
        controller.load_collection().await.unwrap();

        controller.queries.invalidate(&controller.key());
        transport.fail_next(ApiError::Transport("connection refused".to_string()));
        let err = controller.load_collection().await.unwrap_err();
        assert_eq!(err.to_string(), "network error: connection refused");

        let view = controller.snapshot();
        assert_eq!(view.error.as_deref(), Some("network error: connection refused"));
        assert_eq!(view.items.len(), 1);
        assert!(view.render().contains("error: network error: connection refused"));

        controller.load_collection().await.unwrap();
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn first_read_failure_renders_error_only() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        transport.fail_next(ApiError::Transport("connection refused".to_string()));

        assert!(controller.load_collection().await.is_err());
        assert_eq!(
            controller.snapshot().render(),
            "Tasks (0)\nerror: network error: connection refused\n"
        );
    }

    #[tokio::test]
    async fn failed_create_keeps_form_and_reports() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.load_collection().await.unwrap();
        controller.set_form(TodoForm::new("Buy milk"));
        transport.fail_next(ApiError::Transport("timed out".to_string()));

        assert!(controller.submit_create().await.is_err());
        assert_eq!(controller.form(), TodoForm::new("Buy milk"));
        assert_eq!(controller.error().as_deref(), Some("network error: timed out"));
        assert!(!controller.is_pending(Control::Create));
        // A failed write does not invalidate.
        assert!(controller.queries.is_fresh(&controller.key()));

        controller.dismiss_error();
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn delete_of_missing_id_reports_not_found() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);

        let err = controller.submit_delete(42).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(controller.error().as_deref(), Some("not found: Todo not found"));
    }

    #[tokio::test]
    async fn pending_gates_only_its_own_control() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.set_form(TodoForm::new("Buy milk"));
        controller.submit_create().await.unwrap();
        let gate = transport.close_gate();
        let sent = transport.requests().len();

        let (first, second) = tokio::join!(controller.submit_delete(1), async {
            let second = controller.submit_delete(1).await;
            assert!(controller.is_pending(Control::Delete(1)));
            assert!(!controller.is_pending(Control::Update(1)));
            assert!(!controller.is_pending(Control::Create));
            gate.add_permits(1);
            second
        });

        assert_eq!(first.unwrap(), Submission::Done);
        assert_eq!(second.unwrap(), Submission::Busy);
        assert_eq!(transport.requests().len(), sent + 1);
        assert!(!controller.is_pending(Control::Delete(1)));
    }

    #[tokio::test]
    async fn writes_on_different_controls_run_together() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        for title in ["one", "two"] {
            controller.set_form(TodoForm::new(title));
            controller.submit_create().await.unwrap();
        }
        let items = controller.load_collection().await.unwrap();

        let (toggled, deleted) = tokio::join!(
            controller.submit_toggle(&items[0]),
            controller.submit_delete(items[1].id)
        );
        assert_eq!(toggled.unwrap(), Submission::Done);
        assert_eq!(deleted.unwrap(), Submission::Done);

        let items = controller.load_collection().await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].completed);
    }

    #[tokio::test]
    async fn user_duplicate_email_is_reported_verbatim() {
        let transport = Arc::new(RouterTransport::new());
        let controller = users(&transport);
        let form = UserForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Admin,
            is_active: true,
        };

        controller.set_form(form.clone());
        assert_eq!(controller.submit_create().await.unwrap(), Submission::Done);

        controller.set_form(form.clone());
        let err = controller.submit_create().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 400: Email already registered");
        assert_eq!(controller.form(), form);

        let listed = controller.load_collection().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].role, UserRole::Admin);
    }

    #[tokio::test]
    async fn user_partial_update() {
        let transport = Arc::new(RouterTransport::new());
        let controller = users(&transport);
        controller.edit_form(|form| {
            form.name = "Ada".to_string();
            form.email = "ada@example.com".to_string();
        });
        controller.submit_create().await.unwrap();

        let update = UpdateUser {
            is_active: Some(false),
            ..UpdateUser::default()
        };
        controller.submit_update(1, update).await.unwrap();

        let listed = controller.load_collection().await.unwrap();
        assert!(!listed[0].is_active);
        assert_eq!(listed[0].email, "ada@example.com");
        assert!(controller.snapshot().render().contains("(inactive)"));
    }

    #[tokio::test]
    async fn update_to_taken_email_is_reported_without_invalidating() {
        let transport = Arc::new(RouterTransport::new());
        let controller = users(&transport);
        for (name, email) in [("Ada", "ada@example.com"), ("Bob", "bob@example.com")] {
            controller.edit_form(|form| {
                form.name = name.to_string();
                form.email = email.to_string();
            });
            controller.submit_create().await.unwrap();
        }
        controller.load_collection().await.unwrap();

        let update = UpdateUser {
            email: Some("ada@example.com".to_string()),
            ..UpdateUser::default()
        };
        let err = controller.submit_update(2, update).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 400: Email already registered");
        assert_eq!(
            controller.error().as_deref(),
            Some("HTTP 400: Email already registered")
        );
        assert!(controller.queries.is_fresh(&controller.key()));
        assert!(!controller.is_pending(Control::Update(2)));

        controller.queries.invalidate(&controller.key());
        let listed = controller.load_collection().await.unwrap();
        assert_eq!(listed[1].email, "bob@example.com");
    }

    #[tokio::test]
    async fn failed_write_on_empty_list_keeps_empty_state() {
        let transport = Arc::new(RouterTransport::new());
        let controller = todos(&transport);
        controller.load_collection().await.unwrap();

        assert!(controller.submit_delete(42).await.is_err());
        assert_eq!(
            controller.snapshot().render(),
            "Tasks (0)\nerror: not found: Todo not found\nNo tasks yet. Add one above!\n"
        );
    }

    #[tokio::test]
    async fn observer_refetches_after_another_controllers_write() {
        let transport = Arc::new(RouterTransport::new());
        let queries = QueryClient::new();
        let reader = Arc::new(TodoListController::new(
            TodoClient::new(RouterTransport::BASE_URL),
            transport.clone(),
            queries.clone(),
        ));
        let writer = TodoListController::new(
            TodoClient::new(RouterTransport::BASE_URL),
            transport.clone(),
            queries.clone(),
        );
        reader.load_collection().await.unwrap();

        let observer = tokio::spawn({
            let reader = reader.clone();
            async move { reader.refetch_on_invalidation().await }
        });
        tokio::task::yield_now().await;

        writer.set_form(TodoForm::new("Buy milk"));
        writer.submit_create().await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), async {
            while !queries.is_fresh(&reader.key()) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(reader.snapshot().items.len(), 1);
        observer.abort();
    }
}
