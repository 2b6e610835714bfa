//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (when `PRODUCT_STORE=appwrite`, the default)
//! - `APPWRITE_PROJECT_ID` - Appwrite project that owns the database
//! - `APPWRITE_DATABASE_ID` - Database holding the product collection
//! - `APPWRITE_COLLECTION_ID` - Product collection
//!
//! ## Optional
//! - `APPWRITE_ENDPOINT` - API endpoint (default: <https://nyc.cloud.appwrite.io/v1>)
//! - `APPWRITE_API_KEY` - Server API key (omit to act as an anonymous client)
//! - `PRODUCT_STORE` - `appwrite` or `memory` (default: appwrite)
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL (default: `http://{host}:{port}`)
//! - `PRODUCT_CURRENCY_SYMBOL` - Symbol shown before prices (default: ₱)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use product_manager_core::{CollectionId, DatabaseId, ProjectId};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_APPWRITE_ENDPOINT: &str = "https://nyc.cloud.appwrite.io/v1";
const DEFAULT_CURRENCY_SYMBOL: &str = "₱";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which product store backs the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// The hosted Appwrite collection.
    #[default]
    Appwrite,
    /// An in-process collection, lost on restart. For local development.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "appwrite" => Ok(Self::Appwrite),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store '{other}' (expected appwrite or memory)")),
        }
    }
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Selected product store
    pub store: StoreBackend,
    /// Appwrite connection (present when `store` is `Appwrite`)
    pub appwrite: Option<AppwriteConfig>,
    /// Currency symbol rendered before prices
    pub currency_symbol: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Appwrite Databases API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AppwriteConfig {
    /// API endpoint including the version segment (e.g. `https://cloud.appwrite.io/v1`)
    pub endpoint: Url,
    pub project_id: ProjectId,
    pub database_id: DatabaseId,
    pub collection_id: CollectionId,
    /// Server API key; without it requests rely on collection permissions
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .field("database_id", &self.database_id)
            .field("collection_id", &self.collection_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AppwriteConfig {
    fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let endpoint = env.or_default("APPWRITE_ENDPOINT", DEFAULT_APPWRITE_ENDPOINT);
        let endpoint = Url::parse(endpoint.trim_end_matches('/')).map_err(|e| {
            ConfigError::InvalidEnvVar("APPWRITE_ENDPOINT".to_string(), e.to_string())
        })?;

        let api_key = match env.optional("APPWRITE_API_KEY") {
            Some(key) => {
                validate_secret_strength(&key, "APPWRITE_API_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };

        Ok(Self {
            endpoint,
            project_id: ProjectId::new(env.required("APPWRITE_PROJECT_ID")?),
            database_id: DatabaseId::new(env.required("APPWRITE_DATABASE_ID")?),
            collection_id: CollectionId::new(env.required("APPWRITE_COLLECTION_ID")?),
            api_key,
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_source(&EnvSource(&lookup))
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AdminConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource(&lookup))
    }

    fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        let host = env
            .or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = env
            .optional("ADMIN_BASE_URL")
            .unwrap_or_else(|| format!("http://{}", SocketAddr::new(host, port)));

        let store = env
            .or_default("PRODUCT_STORE", "appwrite")
            .parse::<StoreBackend>()
            .map_err(|e| ConfigError::InvalidEnvVar("PRODUCT_STORE".to_string(), e))?;
        let appwrite = match store {
            StoreBackend::Appwrite => Some(AppwriteConfig::from_source(env)?),
            StoreBackend::Memory => None,
        };

        let currency_symbol = env.or_default("PRODUCT_CURRENCY_SYMBOL", DEFAULT_CURRENCY_SYMBOL);
        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            store,
            appwrite,
            currency_symbol,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for running against the in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "http://127.0.0.1:3001".to_string(),
            store: StoreBackend::Memory,
            appwrite: None,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Key lookup used while loading configuration.
struct EnvSource<'a>(&'a dyn Fn(&str) -> Option<String>);

impl EnvSource<'_> {
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Unset and blank values both count as absent.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key generated by the Appwrite console."
            ),
        ));
    }

    Ok(())
}
