//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! deploy.toml (optional)
//!     → loader.rs (parse & deserialize, defaults when absent)
//!     → validation.rs (semantic checks)
//!     → CLI overrides (main.rs)
//!     → DeployConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets (private key, explorer API key) come from the environment only

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_or_default, ConfigError};
pub use schema::DeployConfig;
pub use schema::DeploymentConfig;
pub use schema::NetworkConfig;
pub use schema::ObservabilityConfig;
pub use schema::VerificationConfig;
