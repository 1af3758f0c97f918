//! Configuration for the OCR-to-ingredients service.
//!
//! All behaviour is controlled through [`ServiceConfig`], built via its
//! [`ServiceConfigBuilder`] or read from the environment with
//! [`ServiceConfig::from_env`]. Keeping every knob in one struct makes it
//! trivial to share the config across handlers and to diff two deployments
//! to understand why their outputs differ.
//!
//! API keys are plain strings read once at startup; the clients holding them
//! are read-only after construction, so there is no shared mutable state
//! between concurrent requests.

use crate::error::Menu2IngredientsError;
use std::fmt;
use std::str::FromStr;

/// Deployment environment. Controls default log verbosity and whether 500
/// responses echo error detail back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = Menu2IngredientsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(Menu2IngredientsError::InvalidConfig(format!(
                "unknown environment '{other}' (expected 'development' or 'production')"
            ))),
        }
    }
}

impl Environment {
    /// True when running in production.
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Configuration for the service and its two remote-API clients.
///
/// # Example
/// ```rust
/// use menu2ingredients::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .spoonacular_api_key("sk-recipes")
///     .openai_api_key("sk-model")
///     .port(8080)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// API key for the recipe-search API. `None` means unconfigured: lookups
    /// will fail closed (empty results) and `/api/health` reports it.
    pub spoonacular_api_key: Option<String>,

    /// API key for the chat-completion API. `None` means unconfigured.
    pub openai_api_key: Option<String>,

    /// Chat-completion model identifier. Default: "gpt-4o".
    pub model: String,

    /// Per-remote-call timeout in seconds. Default: 10.
    ///
    /// Each remote call applies its own fixed timeout and fails closed
    /// (empty/default result) on expiry; there is no caller-driven
    /// cancellation.
    pub api_timeout_secs: u64,

    /// Number of recipe-search hits requested per lookup. Default: 5.
    ///
    /// More hits widen the extracted ingredient union and raise the derived
    /// confidence (`min(1, hits/3)`), at the cost of noisier ingredients.
    pub search_results: u32,

    /// Listen address for the HTTP server. Default: "0.0.0.0".
    pub host: String,

    /// Listen port. Default: 5000.
    pub port: u16,

    /// Deployment environment. Default: development.
    pub environment: Environment,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            spoonacular_api_key: None,
            openai_api_key: None,
            model: "gpt-4o".to_string(),
            api_timeout_secs: 10,
            search_results: 5,
            host: "0.0.0.0".to_string(),
            port: 5000,
            environment: Environment::default(),
        }
    }
}

impl fmt::Debug for ServiceConfig {
    // Keys are secrets; log only whether they are present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field(
                "spoonacular_api_key",
                &self.spoonacular_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("model", &self.model)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("search_results", &self.search_results)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read configuration from the environment.
    ///
    /// Recognised variables: `SPOONACULAR_API_KEY`, `OPENAI_API_KEY`,
    /// `MENU2INGREDIENTS_MODEL`, `HOST`, `PORT`, `ENVIRONMENT`.
    /// Missing keys are tolerated (the corresponding client fails closed);
    /// a malformed `PORT` or `ENVIRONMENT` is an error.
    pub fn from_env() -> Result<Self, Menu2IngredientsError> {
        let mut builder = Self::builder();

        if let Some(key) = non_empty_var("SPOONACULAR_API_KEY") {
            builder = builder.spoonacular_api_key(key);
        }
        if let Some(key) = non_empty_var("OPENAI_API_KEY") {
            builder = builder.openai_api_key(key);
        }
        if let Some(model) = non_empty_var("MENU2INGREDIENTS_MODEL") {
            builder = builder.model(model);
        }
        if let Some(host) = non_empty_var("HOST") {
            builder = builder.host(host);
        }
        if let Some(port) = non_empty_var("PORT") {
            let port: u16 = port.parse().map_err(|_| {
                Menu2IngredientsError::InvalidConfig(format!("PORT '{port}' is not a valid port"))
            })?;
            builder = builder.port(port);
        }
        if let Some(env) = non_empty_var("ENVIRONMENT") {
            builder = builder.environment(env.parse()?);
        }

        builder.build()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn spoonacular_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.spoonacular_api_key = Some(key.into());
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.openai_api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn search_results(mut self, n: u32) -> Self {
        self.config.search_results = n;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = env;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, Menu2IngredientsError> {
        let c = &self.config;
        if c.port == 0 {
            return Err(Menu2IngredientsError::InvalidConfig(
                "port must be non-zero".into(),
            ));
        }
        if c.search_results == 0 {
            return Err(Menu2IngredientsError::InvalidConfig(
                "search_results must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(Menu2IngredientsError::InvalidConfig(
                "model must be non-empty".into(),
            ));
        }
        Ok(self.config)
    }
}
