//! The `acme` command line: a text front end over the list controllers.

use std::path::PathBuf;
use std::sync::Arc;

use acme_sdk::{
    ApiError, HealthClient, ItemId, TodoClient, TodoForm, UserClient, UserForm, UserRole,
};
use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};

use crate::cache::QueryClient;
use crate::config::AppConfig;
use crate::controller::{ListController, Submission, TodoListController, UserListController};
use crate::transport::{ReqwestTransport, Transport};

/// acme - manage todos and users on the backend API
#[derive(Debug, Parser)]
#[command(name = "acme")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the API, overriding configuration
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Configuration file
    #[arg(long, global = true, default_value = crate::config::CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the API is reachable
    Health,
    /// Todo list commands
    Todos {
        #[command(subcommand)]
        command: TodoCommand,
    },
    /// User list commands
    Users {
        #[command(subcommand)]
        command: UserCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum TodoCommand {
    /// Show all todos
    List,
    /// Add a todo
    Add { title: String },
    /// Flip a todo between done and not done
    Toggle { id: ItemId },
    /// Remove a todo
    Delete { id: ItemId },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Show all users
    List,
    /// Add a user
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
        /// Create the user as inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Remove a user
    Delete { id: ItemId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    User,
    Guest,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::User => UserRole::User,
            RoleArg::Guest => UserRole::Guest,
        }
    }
}

/// Run `command` against the configured API over HTTP.
pub async fn execute(command: Command, config: &AppConfig) -> anyhow::Result<String> {
    let transport = Arc::new(ReqwestTransport::new(config.timeout())?);
    execute_with(command, &config.api_url, transport).await
}

/// Run `command` over any transport and return the text to print.
pub async fn execute_with<T: Transport>(
    command: Command,
    api_url: &str,
    transport: Arc<T>,
) -> anyhow::Result<String> {
    let queries = QueryClient::new();
    match command {
        Command::Health => {
            let health = HealthClient::new(api_url);
            let response = transport.execute(health.build_health_check()).await?;
            let message = health.parse_health_check(response)?;
            Ok(format!("{}\n", message.message))
        }
        Command::Todos { command } => {
            let controller: TodoListController<T> =
                ListController::new(TodoClient::new(api_url), transport, queries);
            run_todos(&controller, command).await
        }
        Command::Users { command } => {
            let controller: UserListController<T> =
                ListController::new(UserClient::new(api_url), transport, queries);
            run_users(&controller, command).await
        }
    }
}

fn check(submission: Submission) -> anyhow::Result<()> {
    match submission {
        Submission::Done => Ok(()),
        Submission::Invalid => bail!("nothing to submit"),
        Submission::Busy => bail!("another request is still in flight"),
    }
}

async fn run_todos<T: Transport>(
    controller: &TodoListController<T>,
    command: TodoCommand,
) -> anyhow::Result<String> {
    match command {
        TodoCommand::List => {}
        TodoCommand::Add { title } => {
            controller.set_form(TodoForm::new(title));
            check(controller.submit_create().await?)?;
        }
        TodoCommand::Toggle { id } => {
            let todos = controller.load_collection().await?;
            let Some(todo) = todos.iter().find(|todo| todo.id == id) else {
                return Err(ApiError::NotFound {
                    detail: format!("todo {id} is not in the list"),
                }
                .into());
            };
            check(controller.submit_toggle(todo).await?)?;
        }
        TodoCommand::Delete { id } => {
            check(controller.submit_delete(id).await?)?;
        }
    }
    controller.load_collection().await?;
    Ok(controller.snapshot().render())
}

async fn run_users<T: Transport>(
    controller: &UserListController<T>,
    command: UserCommand,
) -> anyhow::Result<String> {
    match command {
        UserCommand::List => {}
        UserCommand::Add {
            name,
            email,
            role,
            inactive,
        } => {
            controller.set_form(UserForm {
                name,
                email,
                role: role.into(),
                is_active: !inactive,
            });
            check(controller.submit_create().await?)?;
        }
        UserCommand::Delete { id } => {
            check(controller.submit_delete(id).await?)?;
        }
    }
    controller.load_collection().await?;
    Ok(controller.snapshot().render())
}
