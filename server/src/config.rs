use axum::http::HeaderValue;
use iso_currency::Currency;
use serde::Deserialize;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("'{0}' must be set and non-empty")]
    Missing(&'static str),

    #[error("'gateway.currency' is not an ISO-4217 code: {0}")]
    InvalidCurrency(String),

    #[error("'allowed-origins' entry is not a valid origin: {0}")]
    InvalidOrigin(String),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Bounds recording a verified payment; the settle route is exempt from
    /// `request-timeout-secs`.
    #[serde(default = "default_settlement_timeout_secs")]
    pub settlement_timeout_secs: u64,
    /// Browser origins allowed to call the API. Empty means same-origin only.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub postgres: PostgresConfig,
    pub gateway: GatewayConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub sharing: SharingConfig,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct PostgresConfig {
    pub uri: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct AdminConfig {
    pub api_token: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct SharingConfig {
    #[serde(default)]
    pub webhook_urls: Vec<String>,
    #[serde(default = "default_sharing_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            webhook_urls: Vec::new(),
            timeout_secs: default_sharing_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_settlement_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    5
}

fn default_gateway_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    10
}

fn default_sharing_timeout_secs() -> u64 {
    5
}

impl ServerConfig {
    /// Parses and validates a TOML config.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<ServerConfig>(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects blank credentials and unknown currencies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("postgres.uri", &self.postgres.uri),
            ("gateway.base-url", &self.gateway.base_url),
            ("gateway.key-id", &self.gateway.key_id),
            ("gateway.key-secret", &self.gateway.key_secret),
            ("admin.api-token", &self.admin.api_token),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        self.gateway.currency()?;
        self.allowed_origins()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn settlement_timeout(&self) -> Duration {
        Duration::from_secs(self.settlement_timeout_secs)
    }

    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.allowed_origins
            .iter()
            .map(|origin| {
                let trimmed = origin.trim().trim_end_matches('/');
                if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                    return Err(ConfigError::InvalidOrigin(origin.clone()));
                }
                HeaderValue::from_str(trimmed)
                    .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
            })
            .collect()
    }
}

impl GatewayConfig {
    pub fn currency(&self) -> Result<Currency, ConfigError> {
        Currency::from_code(&self.currency)
            .ok_or_else(|| ConfigError::InvalidCurrency(self.currency.clone()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SharingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        port = 8080

        [postgres]
        uri = "postgres://localhost/hopewell"

        [gateway]
        key-id = "rzp_test_key"
        key-secret = "secret"

        [admin]
        api-token = "admin-token"
    "#;

    #[test]
    pub fn defaults_are_applied() {
        let config = ServerConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.settlement_timeout(), Duration::from_secs(30));
        assert!(config.allowed_origins().unwrap().is_empty());
        assert_eq!(config.postgres.max_connections, 5);
        assert_eq!(config.gateway.base_url, "https://api.razorpay.com");
        assert_eq!(config.gateway.currency().unwrap(), Currency::INR);
        assert_eq!(config.gateway.timeout(), Duration::from_secs(10));
        assert!(config.sharing.webhook_urls.is_empty());
    }

    #[test]
    pub fn blank_secret_fails_fast() {
        let input = MINIMAL.replace(r#"key-secret = "secret""#, r#"key-secret = "  ""#);
        assert!(matches!(
            ServerConfig::from_toml(&input),
            Err(ConfigError::Missing("gateway.key-secret"))
        ));
    }

    #[test]
    pub fn missing_section_fails_to_parse() {
        let input = MINIMAL.replace("[admin]", "").replace(r#"api-token = "admin-token""#, "");
        assert!(matches!(
            ServerConfig::from_toml(&input),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    pub fn unknown_currency_is_rejected() {
        let input = MINIMAL.replace(
            r#"key-secret = "secret""#,
            "key-secret = \"secret\"\ncurrency = \"XYZ\"",
        );
        assert!(matches!(
            ServerConfig::from_toml(&input),
            Err(ConfigError::InvalidCurrency(code)) if code == "XYZ"
        ));
    }

    #[test]
    pub fn allowed_origins_are_parsed() {
        let input = format!(
            "allowed-origins = [\"https://hopewell.org/\", \"http://localhost:5173\"]\n{}",
            MINIMAL
        );
        let config = ServerConfig::from_toml(&input).unwrap();
        assert_eq!(
            config.allowed_origins().unwrap(),
            vec![
                HeaderValue::from_static("https://hopewell.org"),
                HeaderValue::from_static("http://localhost:5173"),
            ]
        );
    }

    #[test]
    pub fn malformed_origin_is_rejected() {
        let input = format!("allowed-origins = [\"hopewell.org\"]\n{}", MINIMAL);
        assert!(matches!(
            ServerConfig::from_toml(&input),
            Err(ConfigError::InvalidOrigin(_))
        ));
    }
}
