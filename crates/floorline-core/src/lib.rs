use thiserror::Error;

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod normalize;
pub mod pricing;
pub mod promotion;

pub use app_config::{AppConfig, Environment};
pub use catalog::{Catalog, CatalogError, PriceUpdate, ProductVariant, SUPPORTED_WIDTHS};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
