pub mod settings;

pub use settings::{
    AppConfig, AuthConfig, CdnConfig, DatabaseConfig, DeploymentMode, KeepAliveConfig,
    ServerConfig,
};
