use secrecy::SecretString;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid URL in {var}: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Listener settings.
///
/// Reads from environment variables:
/// - `FLATFILE_API_KEY`: Platform secret key (required)
/// - `FLATFILE_API_URL`: API base URL (optional, defaults to `https://platform.flatfile.com/api/v1`)
/// - `WEBHOOK_RECEIVER_URL`: Where submitted records are posted (required)
/// - `LISTENER_NAMESPACE`: Namespace pattern events must match (optional, defaults to `*:appOne`)
/// - `WORKBOOK_NAME`: Name of the workbook created per space (optional, defaults to `Workbook One`)
#[derive(Debug)]
pub struct ListenerConfig {
    pub api_base_url: Url,
    pub api_key: SecretString,
    pub webhook_receiver_url: Url,
    pub namespace: String,
    pub workbook_name: String,
}

impl ListenerConfig {
    pub const DEFAULT_API_URL: &'static str = "https://platform.flatfile.com/api/v1";
    pub const DEFAULT_NAMESPACE: &'static str = "*:appOne";
    pub const DEFAULT_WORKBOOK_NAME: &'static str = "Workbook One";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("FLATFILE_API_KEY").ok_or(ConfigError::Missing("FLATFILE_API_KEY"))?;
        let api_base_url = parse_url(
            "FLATFILE_API_URL",
            &var("FLATFILE_API_URL").unwrap_or_else(|| Self::DEFAULT_API_URL.to_string()),
        )?;
        let webhook_receiver_url = parse_url(
            "WEBHOOK_RECEIVER_URL",
            &var("WEBHOOK_RECEIVER_URL").ok_or(ConfigError::Missing("WEBHOOK_RECEIVER_URL"))?,
        )?;
        let namespace =
            var("LISTENER_NAMESPACE").unwrap_or_else(|| Self::DEFAULT_NAMESPACE.to_string());
        let workbook_name =
            var("WORKBOOK_NAME").unwrap_or_else(|| Self::DEFAULT_WORKBOOK_NAME.to_string());

        Ok(Self {
            api_base_url,
            api_key: SecretString::from(api_key),
            webhook_receiver_url,
            namespace,
            workbook_name,
        })
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { var, source })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::ValidationError(format!(
            "{var} must use http or https, got {other}"
        ))),
    }
}
