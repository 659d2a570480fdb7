//! Compiled contract artifacts.
//!
//! # Data Flow
//! ```text
//! artifacts/ (produced by the compiler toolchain)
//!     → hardhat.rs (locate + parse artifact, build info)
//!     → factory.rs (creation code + constructor args)
//!     → deploy backend
//! ```

pub mod factory;
pub mod hardhat;

use std::path::PathBuf;

use thiserror::Error;

pub use factory::ContractFactory;
pub use hardhat::{ArtifactStore, BuildInfo, ContractArtifact};

/// Errors raised while reading artifacts or building creation code.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("No artifact for contract '{name}' under {root}")]
    NotFound { name: String, root: PathBuf },

    #[error("Contract name '{name}' is ambiguous ({} artifacts), use <source>:<name>", .paths.len())]
    Ambiguous { name: String, paths: Vec<PathBuf> },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Interfaces and abstract contracts compile to empty bytecode.
    #[error("Contract '{0}' has no creation bytecode")]
    NotDeployable(String),

    #[error("Contract '{name}' needs library links: {}", .libraries.join(", "))]
    UnlinkedLibraries { name: String, libraries: Vec<String> },

    #[error("Invalid bytecode for '{name}': {reason}")]
    InvalidBytecode { name: String, reason: String },

    #[error("Invalid ABI for '{name}': {reason}")]
    Abi { name: String, reason: String },

    #[error("Constructor of '{name}' takes {expected} arguments, got {actual}")]
    ConstructorArity {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Constructor argument {index} of '{name}' must be {expected}")]
    ConstructorType {
        name: String,
        index: usize,
        expected: String,
    },
}

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;
