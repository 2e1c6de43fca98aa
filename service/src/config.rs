use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::deserialize_vec_from_string_or_vec;
use std::time::Duration;

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with RC_ prefix (always wins)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub security_headers: SecurityHeadersConfig,
    #[serde(default)]
    pub graphql: GraphQLConfig,
    #[serde(default)]
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP server bind address.
    #[serde(default = "default_host")]
    pub host: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Assistant endpoint that receives `{"message": ...}` and answers `{"reply": ...}`.
    #[serde(default = "default_chat_endpoint")]
    pub endpoint: String,

    /// Bot line appended when the endpoint is unreachable or answers non-2xx.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,

    /// Per-request timeout. Unset waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// JSON catalog file. Unset uses the built-in placeholder directory.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionsConfig {
    /// Upper bound on concurrently held visitor sessions.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// A session unused for this long expires and frees its slot.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl SessionsConfig {
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests.
    /// Use `"*"` to allow any origin (not recommended for production).
    /// Accepts either an array or comma-separated string.
    /// Example: `["http://localhost:3000"]` or `"http://localhost:3000,https://app.example.com"`
    #[serde(
        default = "default_allowed_origins",
        deserialize_with = "deserialize_origins"
    )]
    pub allowed_origins: Vec<String>,
}

/// Deserialize origins from comma-separated string or array, filtering empty values.
fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let origins: Vec<String> = deserialize_vec_from_string_or_vec(deserializer)?;
    Ok(origins.into_iter().filter(|s| !s.is_empty()).collect())
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chat_endpoint() -> String {
    "http://127.0.0.1:5000/chat".to_string()
}

fn default_fallback_message() -> String {
    crate::chat::DEFAULT_FALLBACK_MESSAGE.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_sessions() -> usize {
    10_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_idle_timeout_secs() -> u64 {
    1800 // 30 minutes
}

#[allow(clippy::missing_const_for_fn)]
fn default_allowed_origins() -> Vec<String> {
    // Default to empty (no cross-origin requests allowed)
    // Configure explicitly via RC_CORS__ALLOWED_ORIGINS or config.yaml
    vec![]
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chat_endpoint(),
            fallback_message: default_fallback_message(),
            timeout_secs: None,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityHeadersConfig {
    /// Enable security headers (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Enable HSTS header (default: false, enable in production with HTTPS).
    #[serde(default)]
    pub hsts_enabled: bool,

    /// HSTS max-age in seconds (default: 31536000 = 1 year).
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age: u64,

    /// Include subdomains in HSTS (default: true).
    #[serde(default = "default_true")]
    pub hsts_include_subdomains: bool,

    /// X-Frame-Options value: "DENY" or "SAMEORIGIN" (default: "DENY").
    #[serde(default = "default_frame_options")]
    pub frame_options: String,

    /// Content-Security-Policy header value (default: "default-src 'self'").
    #[serde(default = "default_csp")]
    pub content_security_policy: String,

    /// Referrer-Policy header value (default: "strict-origin-when-cross-origin").
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_hsts_max_age() -> u64 {
    31_536_000 // 1 year
}

fn default_frame_options() -> String {
    "DENY".to_string()
}

fn default_csp() -> String {
    "default-src 'self'".to_string()
}

fn default_referrer_policy() -> String {
    "strict-origin-when-cross-origin".to_string()
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            hsts_enabled: false,
            hsts_max_age: default_hsts_max_age(),
            hsts_include_subdomains: default_true(),
            frame_options: default_frame_options(),
            content_security_policy: default_csp(),
            referrer_policy: default_referrer_policy(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GraphQLConfig {
    /// Enable GraphQL Playground UI at /graphql (GET).
    /// Enable in development via `RC_GRAPHQL__PLAYGROUND_ENABLED=true`
    #[serde(default)]
    pub playground_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SwaggerConfig {
    /// Enable Swagger UI at /swagger-ui.
    /// Enable in development via `RC_SWAGGER__ENABLED=true`
    #[serde(default)]
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: default_port(),
                host: default_host(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
            },
            chat: ChatConfig::default(),
            catalog: CatalogConfig::default(),
            sessions: SessionsConfig::default(),
            cors: CorsConfig::default(),
            security_headers: SecurityHeadersConfig::default(),
            graphql: GraphQLConfig::default(),
            swagger: SwaggerConfig::default(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with RC_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("RC_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port cannot be 0".into()));
        }

        let endpoint = &self.chat.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "chat.endpoint must start with http:// or https://, got: '{endpoint}'"
            )));
        }

        if self.chat.fallback_message.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chat.fallback_message cannot be empty".into(),
            ));
        }

        if self.chat.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "chat.timeout_secs cannot be 0. Leave it unset to wait indefinitely.".into(),
            ));
        }

        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::Validation(
                "sessions.max_sessions cannot be 0".into(),
            ));
        }

        if self.sessions.idle_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "sessions.idle_timeout_secs cannot be 0".into(),
            ));
        }

        // CORS origins must be valid URLs or "*"
        for origin in &self.cors.allowed_origins {
            if origin != "*" && !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "cors.allowed_origins contains invalid origin '{origin}'. Must be '*' or start with http:// or https://"
                )));
            }
        }

        let frame_opts = self.security_headers.frame_options.to_uppercase();
        if frame_opts != "DENY" && frame_opts != "SAMEORIGIN" {
            return Err(ConfigError::Validation(format!(
                "security_headers.frame_options must be 'DENY' or 'SAMEORIGIN', got: '{}'",
                self.security_headers.frame_options
            )));
        }

        Ok(())
    }
}
