/// Configuration management for the client
///
/// Configuration is layered: built-in defaults, then an optional
/// `taskdeck.toml` in the working directory, then environment variables
/// (a `.env` file is loaded first, for development).
///
/// # Environment Variables
///
/// - `TASKDECK_API__BASE_URL`: Backend origin (default: http://localhost:8000)
/// - `TASKDECK_API__GRAPHQL_PATH`: GraphQL endpoint path (default: /graphql/)
/// - `TASKDECK_API__LOGOUT_PATH`: Logout endpoint path (default: /logout/)
/// - `TASKDECK_API__CSRF_COOKIE`: Anti-forgery cookie name (default: csrftoken)
/// - `TASKDECK_API__CSRF_HEADER`: Anti-forgery header name (default: X-CSRFToken)
/// - `TASKDECK_HTTP__USER_AGENT`: User agent sent with every request
/// - `RUST_LOG`: Log level (default: taskdeck_client=info)
///
/// # Example
///
/// ```no_run
/// use taskdeck_client::config::ClientConfig;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = ClientConfig::from_env()?;
/// println!("GraphQL endpoint: {}", config.graphql_url()?);
/// # Ok(())
/// # }
/// ```

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

const ENV_PREFIX: &str = "TASKDECK";
const CONFIG_FILE: &str = "taskdeck";

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Backend endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend origin, e.g. `http://localhost:8000`
    pub base_url: String,

    /// Path of the GraphQL endpoint
    pub graphql_path: String,

    /// Path of the logout endpoint
    pub logout_path: String,

    /// Cookie holding the anti-forgery token
    pub csrf_cookie: String,

    /// Header echoing the anti-forgery token
    pub csrf_header: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            graphql_path: "/graphql/".to_string(),
            logout_path: "/logout/".to_string(),
            csrf_cookie: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("taskdeck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from defaults, `taskdeck.toml` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A source cannot be parsed
    /// - The base URL is not an absolute http(s) URL
    pub fn from_env() -> ClientResult<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let loaded: ClientConfig = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Builds a configuration pointing at `base_url` with default paths
    pub fn for_base_url(base_url: impl Into<String>) -> ClientResult<Self> {
        let config = Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..ApiConfig::default()
            },
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the endpoints resolve to absolute http(s) URLs
    pub fn validate(&self) -> ClientResult<()> {
        let base = self.base_url()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base URL must use http or https, got {}",
                base.scheme()
            )));
        }
        self.graphql_url()?;
        self.logout_url()?;
        Ok(())
    }

    fn base_url(&self) -> ClientResult<Url> {
        Url::parse(&self.api.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {:?}: {}", self.api.base_url, e)))
    }

    /// Absolute GraphQL endpoint URL
    pub fn graphql_url(&self) -> ClientResult<Url> {
        self.join(&self.api.graphql_path)
    }

    /// Absolute logout endpoint URL
    pub fn logout_url(&self) -> ClientResult<Url> {
        self.join(&self.api.logout_path)
    }

    fn join(&self, path: &str) -> ClientResult<Url> {
        self.base_url()?
            .join(path)
            .map_err(|e| ClientError::Config(format!("invalid endpoint path {:?}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = ClientConfig::default();
        assert_eq!(config.graphql_url().unwrap().as_str(), "http://localhost:8000/graphql/");
        assert_eq!(config.logout_url().unwrap().as_str(), "http://localhost:8000/logout/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_base_url() {
        let config = ClientConfig::for_base_url("http://127.0.0.1:9000").unwrap();
        assert_eq!(config.graphql_url().unwrap().as_str(), "http://127.0.0.1:9000/graphql/");
        assert_eq!(config.api.csrf_header, "X-CSRFToken");
    }

    #[test]
    fn test_rejects_relative_or_non_http_base() {
        assert!(ClientConfig::for_base_url("localhost:8000/api").is_err());
        assert!(ClientConfig::for_base_url("not a url").is_err());
        assert!(ClientConfig::for_base_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "api": { "base_url": "https://pm.example.com" }
        }))
        .unwrap();

        assert_eq!(config.api.graphql_path, "/graphql/");
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.graphql_url().unwrap().as_str(), "https://pm.example.com/graphql/");
    }
}
