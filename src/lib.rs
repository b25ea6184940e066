//! A small todo service: a JSON API over SQLite plus a single-page client.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ui;
pub mod view;

pub use api::{router, AppState};
pub use config::Config;
pub use db::{Database, StoreError, TodoStore};
pub use error::ApiError;
pub use models::Todo;
