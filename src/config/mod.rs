//! Configuration types and JSON file loading

pub mod schema;
pub mod store;

pub use schema::{AppConfig, CoordinatorConfig, FreshnessConfig, LoggingConfig};
pub use store::{load_config, load_or_default, resolve_config_path, save_config};
