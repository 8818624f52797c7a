//! Export configuration.
//!
//! Configuration is built once at startup, either from environment variables
//! (`ExportConfig::from_env`) or programmatically through the builder, and is
//! then passed by reference to the authenticator and the Graph client.

use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::ExportError;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of attempts per GET, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Wait applied when a retryable response carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Default Microsoft Graph API version.
pub const DEFAULT_API_VERSION: &str = "v1.0";

/// Microsoft cloud the tenant lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntraCloudEnvironment {
    /// Worldwide commercial cloud.
    #[default]
    Global,
    /// US Government (GCC High / DoD).
    UsGovernment,
    /// China, operated by 21Vianet.
    China,
}

impl EntraCloudEnvironment {
    /// Azure AD authority host for token requests.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Global => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Microsoft Graph host.
    #[must_use]
    pub fn graph_endpoint(&self) -> &'static str {
        match self {
            Self::Global => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }

    /// Parses the `ENTRA_CLOUD` value.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "global" | "commercial" | "public" => Ok(Self::Global),
            "usgov" | "us_government" | "usgovernment" | "gcch" => Ok(Self::UsGovernment),
            "china" | "cn" => Ok(Self::China),
            other => Err(ConfigError::InvalidValue(
                "ENTRA_CLOUD".into(),
                format!("unknown cloud environment '{other}'"),
            )),
        }
    }
}

/// App registration credentials for the client-credentials grant.
#[derive(Debug)]
pub struct EntraCredentials {
    /// Application (client) ID.
    pub client_id: String,
    /// Client secret.
    pub client_secret: SecretString,
}

/// Configuration for one export run.
#[derive(Debug)]
pub struct ExportConfig {
    pub tenant_id: String,
    pub credentials: EntraCredentials,
    pub cloud_environment: EntraCloudEnvironment,
    /// Authority host, without the tenant segment.
    pub login_endpoint: String,
    /// Graph host, without the API version.
    pub graph_endpoint: String,
    pub api_version: String,
    /// Timeout applied to every single HTTP attempt.
    pub request_timeout: Duration,
    /// Attempts per GET before a retryable status becomes fatal.
    pub max_attempts: u32,
    pub default_retry_after: Duration,
    /// Directory the JSON document is written to.
    pub output_dir: PathBuf,
    /// Raises the default log level to debug.
    pub debug: bool,
}

impl ExportConfig {
    /// Creates a builder with the default tunables.
    #[must_use]
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Loads configuration from a custom variable reader.
    ///
    /// Tests use this to supply variables without touching the process
    /// environment.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            match reader(key) {
                Ok(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(ConfigError::MissingVar(key.into())),
            }
        };

        let tenant_id = required("TENANT_ID")?.trim().to_string();
        let client_id = required("CLIENT_ID")?.trim().to_string();
        // Secrets are used exactly as given.
        let client_secret = required("CLIENT_SECRET")?;

        let mut builder = Self::builder()
            .tenant_id(tenant_id)
            .client_id(client_id)
            .client_secret(client_secret);

        if let Ok(cloud) = reader("ENTRA_CLOUD") {
            builder = builder.cloud_environment(EntraCloudEnvironment::parse(&cloud)?);
        }
        if let Ok(endpoint) = reader("ENTRA_LOGIN_ENDPOINT") {
            builder = builder.login_endpoint(endpoint);
        }
        if let Ok(endpoint) = reader("GRAPH_ENDPOINT") {
            builder = builder.graph_endpoint(endpoint);
        }
        if let Ok(version) = reader("GRAPH_API_VERSION") {
            builder = builder.api_version(version);
        }
        if let Ok(secs) = reader("EXPORT_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("EXPORT_TIMEOUT_SECS".into(), e.to_string())
            })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Ok(attempts) = reader("EXPORT_MAX_ATTEMPTS") {
            let attempts = attempts.trim().parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("EXPORT_MAX_ATTEMPTS".into(), e.to_string())
            })?;
            builder = builder.max_attempts(attempts);
        }
        if let Ok(dir) = reader("EXPORT_OUTPUT_DIR") {
            builder = builder.output_dir(dir);
        }

        let debug = reader("EXPORT_DEBUG")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        builder.debug(debug).build()
    }

    /// Base URL for Graph requests, e.g. `https://graph.microsoft.com/v1.0`.
    #[must_use]
    pub fn graph_base_url(&self) -> String {
        format!("{}/{}", self.graph_endpoint, self.api_version)
    }

    /// The users collection URL.
    #[must_use]
    pub fn users_url(&self) -> String {
        format!("{}/users", self.graph_base_url())
    }

    /// Token endpoint for the configured tenant.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_endpoint, self.tenant_id)
    }

    /// `.default` scope of the Graph resource.
    #[must_use]
    pub fn scope(&self) -> String {
        format!("{}/.default", self.graph_endpoint)
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug, Default)]
pub struct ExportConfigBuilder {
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    cloud_environment: EntraCloudEnvironment,
    login_endpoint: Option<String>,
    graph_endpoint: Option<String>,
    api_version: Option<String>,
    request_timeout: Option<Duration>,
    max_attempts: Option<u32>,
    default_retry_after: Option<Duration>,
    output_dir: Option<PathBuf>,
    debug: bool,
}

impl ExportConfigBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    #[must_use]
    pub fn cloud_environment(mut self, cloud_environment: EntraCloudEnvironment) -> Self {
        self.cloud_environment = cloud_environment;
        self
    }

    /// Overrides the authority host picked by the cloud environment.
    #[must_use]
    pub fn login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.login_endpoint = Some(endpoint.into());
        self
    }

    /// Overrides the Graph host picked by the cloud environment.
    #[must_use]
    pub fn graph_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graph_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    #[must_use]
    pub fn default_retry_after(mut self, delay: Duration) -> Self {
        self.default_retry_after = Some(delay);
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> Result<ExportConfig, ConfigError> {
        let non_empty = |value: Option<String>, name: &str| match value {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingVar(name.into())),
        };

        let tenant_id = non_empty(self.tenant_id, "TENANT_ID")?;
        let client_id = non_empty(self.client_id, "CLIENT_ID")?;
        let client_secret = non_empty(self.client_secret, "CLIENT_SECRET")?;

        let login_endpoint = normalize_endpoint(
            "ENTRA_LOGIN_ENDPOINT",
            self.login_endpoint
                .unwrap_or_else(|| self.cloud_environment.login_endpoint().to_string()),
        )?;
        let graph_endpoint = normalize_endpoint(
            "GRAPH_ENDPOINT",
            self.graph_endpoint
                .unwrap_or_else(|| self.cloud_environment.graph_endpoint().to_string()),
        )?;

        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "EXPORT_MAX_ATTEMPTS".into(),
                "must be at least 1".into(),
            ));
        }

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "EXPORT_TIMEOUT_SECS".into(),
                "must be greater than zero".into(),
            ));
        }

        Ok(ExportConfig {
            tenant_id,
            credentials: EntraCredentials {
                client_id,
                client_secret: SecretString::from(client_secret),
            },
            cloud_environment: self.cloud_environment,
            login_endpoint,
            graph_endpoint,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            request_timeout,
            max_attempts,
            default_retry_after: self.default_retry_after.unwrap_or(DEFAULT_RETRY_AFTER),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            debug: self.debug,
        })
    }
}

/// Checks that an endpoint is an absolute http(s) URL and strips any
/// trailing slash so paths can be appended with `format!`.
fn normalize_endpoint(name: &str, endpoint: String) -> Result<String, ConfigError> {
    let parsed = Url::parse(endpoint.trim())
        .map_err(|e| ConfigError::InvalidValue(name.into(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue(
            name.into(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(endpoint.trim().trim_end_matches('/').to_string())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl From<ConfigError> for ExportError {
    fn from(e: ConfigError) -> Self {
        ExportError::Config(e.to_string())
    }
}
