//! Database connection management with lazy initialization.

use std::sync::LazyLock;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use thiserror::Error;
use tokio::sync::OnceCell;
use workforce_core::PortError;

/// Global database instance using lazy initialization.
static DB: LazyLock<OnceCell<Surreal<Any>>> = LazyLock::new(OnceCell::new);

/// Database connection wrapper.
pub type Database = Surreal<Any>;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Connection mode: "mem://" or "file://path"
    pub endpoint: String,
    /// Namespace to use
    pub namespace: String,
    /// Database name to use
    pub database: String,
    /// Optional root credentials for authentication
    pub credentials: Option<(String, String)>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            endpoint: "mem://".to_string(),
            namespace: "workforce".to_string(),
            database: "main".to_string(),
            credentials: None,
        }
    }
}

impl DbConfig {
    /// Create a config for in-memory testing.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Create a config for file-based persistence.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            endpoint: format!("file://{}", path.into()),
            ..Default::default()
        }
    }

    /// Create a config for RocksDB persistence (requires rocksdb feature).
    pub fn rocksdb(path: impl Into<String>) -> Self {
        Self {
            endpoint: format!("rocksdb://{}", path.into()),
            ..Default::default()
        }
    }

    /// Build a config from environment variables.
    ///
    /// - `WORKFORCE_DB_ENDPOINT` (default: `mem://`)
    /// - `WORKFORCE_DB_NAMESPACE` (default: `workforce`)
    /// - `WORKFORCE_DB_DATABASE` (default: `main`)
    /// - `WORKFORCE_DB_USER` and `WORKFORCE_DB_PASS` (optional; both or neither)
    pub fn from_env() -> Result<Self, DbError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DbError> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("WORKFORCE_DB_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(namespace) = lookup("WORKFORCE_DB_NAMESPACE") {
            config.namespace = namespace;
        }
        if let Some(database) = lookup("WORKFORCE_DB_DATABASE") {
            config.database = database;
        }

        match (lookup("WORKFORCE_DB_USER"), lookup("WORKFORCE_DB_PASS")) {
            (Some(user), Some(pass)) => config.credentials = Some((user, pass)),
            (None, None) => {}
            _ => {
                return Err(DbError::Config(
                    "WORKFORCE_DB_USER and WORKFORCE_DB_PASS must be set together".into(),
                ));
            }
        }

        Ok(config)
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set root credentials for authentication.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database not initialized - call init_db first")]
    NotInitialized,
    #[error("Invalid database config: {0}")]
    Config(String),
    #[error("Connection error: {0}")]
    Connection(#[from] surrealdb::Error),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<DbError> for PortError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => PortError::NotFound(what),
            DbError::Query(msg) | DbError::Serialization(msg) => PortError::Rejected(msg),
            other => PortError::Unavailable(other.to_string()),
        }
    }
}

/// Initialize the database connection.
///
/// This should be called once at application startup before any database operations.
pub async fn init_db(config: DbConfig) -> Result<&'static Database, DbError> {
    DB.get_or_try_init(|| async {
        tracing::info!("Connecting to database: {}", config.endpoint);

        let db = connect(&config.endpoint).await?;

        if let Some((username, password)) = &config.credentials {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        tracing::info!(
            "Connected to database: {}/{}",
            config.namespace,
            config.database
        );

        Ok(db)
    })
    .await
}

/// Get the database connection.
pub fn get_db() -> Result<&'static Database, DbError> {
    DB.get().ok_or(DbError::NotInitialized)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_defaults_to_memory() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.endpoint, "mem://");
        assert_eq!(config.namespace, "workforce");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn env_overrides_apply() {
        let config = DbConfig::from_lookup(lookup(&[
            ("WORKFORCE_DB_ENDPOINT", "rocksdb://./data/workforce"),
            ("WORKFORCE_DB_DATABASE", "staging"),
            ("WORKFORCE_DB_USER", "root"),
            ("WORKFORCE_DB_PASS", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "rocksdb://./data/workforce");
        assert_eq!(config.database, "staging");
        assert_eq!(config.credentials, Some(("root".into(), "secret".into())));
    }

    #[test]
    fn half_credentials_are_rejected() {
        let result = DbConfig::from_lookup(lookup(&[("WORKFORCE_DB_USER", "root")]));
        assert!(matches!(result, Err(DbError::Config(_))));
    }

    #[test]
    fn not_found_maps_to_port_not_found() {
        let err: PortError = DbError::NotFound("staff x".into()).into();
        assert_eq!(err, PortError::NotFound("staff x".into()));
        let err: PortError = DbError::NotInitialized.into();
        assert!(matches!(err, PortError::Unavailable(_)));
    }
}
