//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use domain::UserId;

/// User records and sign-in over a local JSON store
#[derive(Parser, Debug)]
#[command(name = "usuarios")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file backing the key-value store
    #[arg(short, long, global = true, env = "USUARIOS_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Fail instead of starting empty when stored users are unreadable
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with a username and password
    Login(LoginArgs),

    /// Sign out
    Logout,

    /// Show the signed-in username
    Whoami,

    /// Manage user records (requires a session)
    Users(UsersArgs),
}

/// Arguments for the login command
#[derive(Parser, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "USUARIOS_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for the users command
#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

/// User record actions
#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// List all users by id
    List,

    /// Show one user
    Show { id: UserId },

    /// Create a user
    Add(AddArgs),

    /// Change fields of a user; omitted fields keep their value
    Edit(EditArgs),

    /// Delete a user
    Remove {
        id: UserId,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Arguments for the add action
#[derive(Parser, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Join date (YYYY-MM-DD), not after today
    #[arg(long)]
    pub join_date: NaiveDate,

    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

/// Arguments for the edit action
#[derive(Parser, Debug)]
pub struct EditArgs {
    pub id: UserId,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Join date (YYYY-MM-DD), not after today
    #[arg(long)]
    pub join_date: Option<NaiveDate>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,
}
