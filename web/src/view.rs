//! Text rendering of a resource list.

use std::fmt::Write as _;

use acme_sdk::{Resource, Todos, Users};

/// How a resource's list is titled and how each row reads.
pub trait Presentation: Resource {
    const HEADING: &'static str;
    const EMPTY_STATE: &'static str;

    fn line(item: &Self::Item) -> String;
}

impl Presentation for Todos {
    const HEADING: &'static str = "Tasks";
    const EMPTY_STATE: &'static str = "No tasks yet. Add one above!";

    fn line(item: &Self::Item) -> String {
        item.to_string()
    }
}

impl Presentation for Users {
    const HEADING: &'static str = "Users";
    const EMPTY_STATE: &'static str = "No users yet. Add one above!";

    fn line(item: &Self::Item) -> String {
        item.to_string()
    }
}

/// What the list view shows at one moment.
#[derive(Debug, Clone)]
pub struct ListView<R: Resource> {
    /// Last successfully loaded collection, in backend order.
    pub items: Vec<R::Item>,
    /// True once a read has succeeded, so `items` reflects the backend.
    pub loaded: bool,
    /// True while the first load has not produced data yet.
    pub loading: bool,
    /// Text of the last failed operation, shown until the next success.
    pub error: Option<String>,
}

impl<R: Presentation> ListView<R> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render as lines of text.
    ///
    /// With no items, the empty-state line appears only when the collection
    /// was actually read as empty. Before any successful read only the
    /// heading and the error or loading line show.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", R::HEADING, self.items.len());
        if let Some(error) = &self.error {
            let _ = writeln!(out, "error: {error}");
        }
        if self.items.is_empty() {
            if self.loading {
                out.push_str("Loading...\n");
            } else if self.loaded {
                let _ = writeln!(out, "{}", R::EMPTY_STATE);
            }
            return out;
        }
        for item in &self.items {
            let _ = writeln!(out, "{}", R::line(item));
        }
        out
    }
}
