use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cdn: CdnConfig,
    pub keep_alive: KeepAliveConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Development,
    Production,
}

impl DeploymentMode {
    pub fn is_production(&self) -> bool {
        matches!(self, DeploymentMode::Production)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub deployment_mode: DeploymentMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Credentials and endpoints for the media CDN. The private key must
/// never be serialized into any response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    pub public_key: String,
    pub private_key: String,
    pub url_endpoint: String,
    pub upload_api_base: String,
    pub management_api_base: String,
    pub auth_expiry_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAliveConfig {
    pub interval_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            cdn: CdnConfig::default(),
            keep_alive: KeepAliveConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            deployment_mode: DeploymentMode::Development,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./data.db".to_string(),
            max_connections: 10,
            connection_timeout_seconds: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
        }
    }
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            private_key: String::new(),
            url_endpoint: String::new(),
            upload_api_base: "https://upload.imagekit.io".to_string(),
            management_api_base: "https://api.imagekit.io".to_string(),
            auth_expiry_seconds: 3600,
        }
    }
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 600,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("_")
                .try_parsing(true),
        );

        // The deployment-named variables win over every layered source.
        builder = builder
            .set_override_option("cdn.public_key", env_opt("CDN_PUBLIC_KEY"))?
            .set_override_option("cdn.private_key", env_opt("CDN_PRIVATE_KEY"))?
            .set_override_option("cdn.url_endpoint", env_opt("CDN_URL_ENDPOINT"))?
            .set_override_option("server.deployment_mode", env_opt("DEPLOYMENT_MODE"))?
            .set_override_option("auth.jwt_secret", env_opt("JWT_SECRET"))?;

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.database.url.is_empty() {
            return Err(ConfigError::Message(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if self.auth.jwt_secret.len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if self.cdn.public_key.is_empty() {
            return Err(ConfigError::Message(
                "CDN_PUBLIC_KEY is not configured".to_string(),
            ));
        }

        if self.cdn.private_key.is_empty() {
            return Err(ConfigError::Message(
                "CDN_PRIVATE_KEY is not configured".to_string(),
            ));
        }

        if self.cdn.url_endpoint.is_empty() {
            return Err(ConfigError::Message(
                "CDN_URL_ENDPOINT is not configured".to_string(),
            ));
        }

        if self.keep_alive.interval_seconds == 0 {
            return Err(ConfigError::Message(
                "Keep-alive interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        config.cdn.public_key = "public_test_key".to_string();
        config.cdn.private_key = "private_test_key".to_string();
        config.cdn.url_endpoint = "https://ik.imagekit.io/acme".to_string();
        config
    }

    #[test]
    fn test_default_config_is_incomplete() {
        // Credentials are deployment-provided, so the bare defaults must
        // refuse to start.
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_each_missing_credential_fails() {
        let mut config = valid_config();
        config.cdn.public_key = String::new();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.cdn.private_key = String::new();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.cdn.url_endpoint = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_jwt_secret_fails() {
        let mut config = valid_config();
        config.auth.jwt_secret = "too-short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let mut config = valid_config();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_deployment_mode() {
        assert!(DeploymentMode::Production.is_production());
        assert!(!DeploymentMode::Development.is_production());

        let mode: DeploymentMode = serde_json::from_str("\"production\"").unwrap();
        assert!(mode.is_production());
    }
}
