use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_DATABASE_PATH: &str = "todo.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5876";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads `TODO_DATABASE_PATH` and `TODO_BIND_ADDR`, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path: PathBuf = lookup("TODO_DATABASE_PATH")
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
            .into();
        let raw_addr =
            lookup("TODO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_addr
            .parse()
            .with_context(|| format!("TODO_BIND_ADDR is not a socket address: {raw_addr}"))?;

        Ok(Self {
            database_path,
            bind_addr,
        })
    }
}
