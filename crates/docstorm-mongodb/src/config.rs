//! Connection configuration.
//!
//! # Example
//! ```rust,ignore
//! use docstorm_mongodb::{AuthMode, ConnectionConfig};
//!
//! // From environment
//! let config = ConnectionConfig::from_env()?;
//!
//! // Or explicit configuration
//! let config = ConnectionConfig::new("db.internal")
//!     .port(27018)
//!     .tls(true)
//!     .credentials("app", "secret", "admin")
//!     .database("perfect_testing");
//! ```

use std::time::Duration;

use crate::{Result, StormError};

/// Default MongoDB port
pub const DEFAULT_PORT: u16 = 27017;

/// Authentication mode used when connecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// No credentials are sent
    #[default]
    None,
    /// Username/password against the auth database
    Standard,
}

impl std::str::FromStr for AuthMode {
    type Err = StormError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "" | "none" => Ok(AuthMode::None),
            "standard" => Ok(AuthMode::Standard),
            other => Err(StormError::Configuration(format!(
                "Unknown auth mode: '{}'. Available modes: none, standard",
                other
            ))),
        }
    }
}

/// Parameters for reaching a MongoDB server
#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub auth_mode: AuthMode,
    pub username: String,
    pub password: String,
    /// Database the credentials are checked against
    pub auth_db: String,
    /// Database used when a record does not name one
    pub database: String,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout (default: 30s)
    pub server_selection_timeout: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            tls: false,
            auth_mode: AuthMode::None,
            username: String::new(),
            password: String::new(),
            auth_db: String::new(),
            database: String::new(),
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            app_name: Some("docstorm".to_string()),
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("auth_mode", &self.auth_mode)
            .field("username", &self.username)
            .field("password", &"***")
            .field("auth_db", &self.auth_db)
            .field("database", &self.database)
            .finish()
    }
}

impl ConnectionConfig {
    /// Create a configuration for `host` with defaults for everything else
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `MONGODB_HOST`, `MONGODB_PORT`, `MONGODB_TLS`, `MONGODB_AUTH_MODE`,
    /// `MONGODB_USERNAME`, `MONGODB_PASSWORD`, `MONGODB_AUTH_DB` and
    /// `MONGODB_DATABASE`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("MONGODB_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("MONGODB_PORT") {
            config.port = port.parse().map_err(|_| {
                StormError::Configuration(format!("Invalid MONGODB_PORT: '{}'", port))
            })?;
        }
        if let Some(tls) = lookup("MONGODB_TLS") {
            config.tls = matches!(tls.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(mode) = lookup("MONGODB_AUTH_MODE") {
            config.auth_mode = mode.parse()?;
        }
        if let Some(username) = lookup("MONGODB_USERNAME") {
            config.username = username;
        }
        if let Some(password) = lookup("MONGODB_PASSWORD") {
            config.password = password;
        }
        if let Some(auth_db) = lookup("MONGODB_AUTH_DB") {
            config.auth_db = auth_db;
        }
        if let Some(database) = lookup("MONGODB_DATABASE") {
            config.database = database;
        }

        Ok(config)
    }

    /// Set port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable TLS
    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = enabled;
        self
    }

    /// Use standard authentication with the given credentials
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        auth_db: impl Into<String>,
    ) -> Self {
        self.auth_mode = AuthMode::Standard;
        self.username = username.into();
        self.password = password.into();
        self.auth_db = auth_db.into();
        self
    }

    /// Set default database
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set application name
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Check that the configuration can produce a usable connection string
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(StormError::Configuration("Host cannot be empty".to_string()));
        }
        if self.auth_mode == AuthMode::Standard && self.username.is_empty() {
            return Err(StormError::Configuration(
                "Standard auth mode requires a username".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the `mongodb://` connection string
    pub fn to_uri(&self) -> String {
        let mut uri = String::from("mongodb://");

        if self.auth_mode == AuthMode::Standard {
            uri.push_str(&urlencoding::encode(&self.username));
            uri.push(':');
            uri.push_str(&urlencoding::encode(&self.password));
            uri.push('@');
        }

        uri.push_str(&self.host);
        uri.push(':');
        uri.push_str(&self.port.to_string());
        uri.push('/');

        let mut params = Vec::new();
        if self.tls {
            params.push("tls=true".to_string());
        }
        if self.auth_mode == AuthMode::Standard && !self.auth_db.is_empty() {
            params.push(format!("authSource={}", urlencoding::encode(&self.auth_db)));
        }
        if !params.is_empty() {
            uri.push('?');
            uri.push_str(&params.join("&"));
        }

        uri
    }
}
