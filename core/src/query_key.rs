//! Keys identifying cached reads.

use std::fmt;

use crate::resource::Resource;
use crate::types::ItemId;

/// Identifies one cacheable read: a resource collection or a single item.
///
/// Writers invalidate by key; the read cache refetches whatever is stored
/// under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    operation: &'static str,
    id: Option<ItemId>,
}

impl QueryKey {
    /// Key of the full collection of `R`.
    pub fn list<R: Resource>() -> Self {
        Self {
            operation: R::LIST_OPERATION,
            id: None,
        }
    }

    /// Key of the single item `id` of `R`.
    pub fn item<R: Resource>(id: ItemId) -> Self {
        Self {
            operation: R::GET_OPERATION,
            id: Some(id),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn id(&self) -> Option<ItemId> {
        self.id
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}:{id}", self.operation),
            None => f.write_str(self.operation),
        }
    }
}
