//! Compile-time bindings for the REST resources.
//!
//! Each resource is a zero-sized marker implementing [`Resource`]. The markers
//! are stamped out by the `resource!` macro from a short declaration, so adding
//! a resource to the backend schema means adding one declaration here.

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::types::{CreateTodo, CreateUser, ItemId, Todo, UpdateTodo, UpdateUser, User};

/// One REST resource: a collection at `/{PATH}` and items at `/{PATH}/{id}`.
pub trait Resource: Send + Sync + 'static {
    /// The record as returned by the backend.
    type Item: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static;
    /// Payload for `POST /{PATH}`.
    type Create: Serialize + Debug + Send + Sync;
    /// Partial payload for `PATCH /{PATH}/{id}`.
    type Update: Serialize + Debug + Default + Send + Sync;

    /// Collection path segment, e.g. `todos`.
    const PATH: &'static str;
    /// Singular name used in messages, e.g. `todo`.
    const NAME: &'static str;
    /// Operation id of the list endpoint, e.g. `listTodos`.
    const LIST_OPERATION: &'static str;
    /// Operation id of the single-item endpoint, e.g. `getTodo`.
    const GET_OPERATION: &'static str;

    fn id(item: &Self::Item) -> ItemId;
}

macro_rules! resource {
    (
        $(#[$meta:meta])*
        $marker:ident {
            path: $path:literal,
            name: $name:literal,
            list: $list:literal,
            get: $get:literal,
            item: $item:ty,
            create: $create:ty,
            update: $update:ty $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $marker;

        impl Resource for $marker {
            type Item = $item;
            type Create = $create;
            type Update = $update;

            const PATH: &'static str = $path;
            const NAME: &'static str = $name;
            const LIST_OPERATION: &'static str = $list;
            const GET_OPERATION: &'static str = $get;

            fn id(item: &Self::Item) -> ItemId {
                item.id
            }
        }
    };
}

resource! {
    /// The `/todos` resource.
    Todos {
        path: "todos",
        name: "todo",
        list: "listTodos",
        get: "getTodo",
        item: Todo,
        create: CreateTodo,
        update: UpdateTodo,
    }
}

resource! {
    /// The `/users` resource.
    Users {
        path: "users",
        name: "user",
        list: "listUsers",
        get: "getUser",
        item: User,
        create: CreateUser,
        update: UpdateUser,
    }
}
