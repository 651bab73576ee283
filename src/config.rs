use reqwest::Url;
use std::{env, path::PathBuf};

/// Public path prefix under which the dev server exposes the backend API.
pub const API_PREFIX: &str = "/api/v1";

/// Fallback API base URL when `API_BASE_URL` is not provided.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

/// AppConfig
///
/// Holds the front-end's configuration. Loaded once at startup and shared
/// (cloned) by the dev server state, the API client and the session store.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format.
    pub env: Env,
    // Base URL every API call is joined onto (scheme, host and API path).
    pub api_base_url: String,
    // Socket address the dev server binds to.
    pub dev_server_addr: String,
    // Directory holding the built application shell (`index.html`).
    pub static_dir: PathBuf,
    // Directory holding the durable ("remembered") session tier.
    pub session_dir: PathBuf,
    // When true, the in-memory mock user service replaces the HTTP one.
    pub use_mock_api: bool,
}

/// Env
///
/// Runtime context. Local gets human-readable logs, Production gets JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Same values `load()` falls back to, without reading the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            dev_server_addr: "127.0.0.1:5173".to_string(),
            static_dir: PathBuf::from("dist"),
            session_dir: PathBuf::from(".edugo"),
            use_mock_api: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from environment variables. Nothing here is
    /// mandatory: unset or empty variables fall back to the defaults.
    pub fn load() -> Self {
        let defaults = Self::default();

        let env = match env_non_empty("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };

        Self {
            env,
            api_base_url: env_non_empty("API_BASE_URL").unwrap_or(defaults.api_base_url),
            dev_server_addr: env_non_empty("DEV_SERVER_ADDR").unwrap_or(defaults.dev_server_addr),
            static_dir: env_non_empty("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            session_dir: env_non_empty("SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),
            use_mock_api: env_bool("USE_MOCK_API").unwrap_or(false),
        }
    }

    /// Where the dev server forwards `/api/v1` traffic.
    pub fn proxy_target(&self) -> ProxyTarget {
        ProxyTarget::from_base_url(&self.api_base_url)
    }
}

/// ProxyTarget
///
/// The API base URL split into the origin requests are forwarded to and the
/// path that replaces the public `/api/v1` prefix.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyTarget {
    pub origin: String,
    pub api_path: String,
}

impl ProxyTarget {
    pub fn from_base_url(base_url: &str) -> Self {
        match Url::parse(base_url) {
            Ok(url) if url.has_host() => {
                let host = url.host_str().unwrap_or_default();
                let origin = match url.port() {
                    Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                    None => format!("{}://{}", url.scheme(), host),
                };
                let api_path = url.path().trim_end_matches('/').to_string();
                Self { origin, api_path }
            }
            _ => {
                tracing::warn!(base_url, "invalid API base URL, proxying with default path");
                Self {
                    origin: base_url.trim_end_matches('/').to_string(),
                    api_path: API_PREFIX.to_string(),
                }
            }
        }
    }

    /// rewrite
    ///
    /// Maps a public `/api/v1/...` path (with optional query) onto the backend URL.
    /// Paths outside the prefix are appended unchanged.
    pub fn rewrite(&self, path_and_query: &str) -> String {
        let rest = path_and_query
            .strip_prefix(API_PREFIX)
            .unwrap_or(path_and_query);
        format!("{}{}{}", self.origin, self.api_path, rest)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses common boolean spellings; anything else is `None`.
pub fn env_bool(key: &str) -> Option<bool> {
    match env_non_empty(key)?.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
