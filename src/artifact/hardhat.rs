//! Hardhat artifact tree reader.
//!
//! Layout:
//! ```text
//! artifacts/
//!   build-info/<id>.json                    solc input + version
//!   contracts/<File>.sol/<Name>.json        abi, bytecode, linkReferences
//!   contracts/<File>.sol/<Name>.dbg.json    { "buildInfo": "../../build-info/<id>.json" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::artifact::{ArtifactError, ArtifactResult};

const BUILD_INFO_DIR: &str = "build-info";
const DEBUG_SUFFIX: &str = ".dbg.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: String,
    source_name: String,
    abi: JsonAbi,
    bytecode: String,
    #[serde(default)]
    link_references: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: String,
}

/// Compiler run that produced an artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Full compiler version, e.g. `0.8.24+commit.e11b9ed9`.
    pub solc_long_version: String,
    /// Standard-JSON compiler input.
    pub input: serde_json::Value,
}

/// A compiled, deployable contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    /// Path of the artifact JSON.
    pub path: PathBuf,
}

impl ContractArtifact {
    /// `<sourceName>:<contractName>`, the form explorers expect.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.name)
    }

    /// Read the build info referenced by the sibling `.dbg.json` file.
    pub fn build_info(&self) -> ArtifactResult<BuildInfo> {
        let debug_path = self.path.with_file_name(format!("{}{}", self.name, DEBUG_SUFFIX));
        let debug: DebugFile = read_json(&debug_path)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        read_json(&dir.join(debug.build_info))
    }
}

/// Parse one artifact file into a deployable contract.
pub fn load_artifact(path: &Path) -> ArtifactResult<ContractArtifact> {
    let raw: RawArtifact = read_json(path)?;

    let libraries: Vec<String> = raw
        .link_references
        .iter()
        .flat_map(|(file, libs)| libs.keys().map(move |lib| format!("{}:{}", file, lib)))
        .collect();
    if !libraries.is_empty() {
        return Err(ArtifactError::UnlinkedLibraries {
            name: raw.contract_name,
            libraries,
        });
    }

    let bytecode: Bytes = raw.bytecode.parse().map_err(|e| ArtifactError::InvalidBytecode {
        name: raw.contract_name.clone(),
        reason: format!("{}", e),
    })?;
    if bytecode.is_empty() {
        return Err(ArtifactError::NotDeployable(raw.contract_name));
    }

    Ok(ContractArtifact {
        name: raw.contract_name,
        source_name: raw.source_name,
        abi: raw.abi,
        bytecode,
        path: path.to_path_buf(),
    })
}

/// Read-only view over a Hardhat artifacts directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the artifact for `name`.
    ///
    /// A fully qualified `path/File.sol:Name` selects one source file; a bare
    /// name must match exactly one artifact in the tree.
    pub fn find(&self, name: &str) -> ArtifactResult<ContractArtifact> {
        let (source, contract) = match name.rsplit_once(':') {
            Some((source, contract)) => (Some(source), contract),
            None => (None, name),
        };

        let mut candidates = Vec::new();
        self.collect_candidates(&self.root, contract, &mut candidates)?;

        let mut matches = Vec::new();
        for path in candidates {
            let raw: RawArtifact = read_json(&path)?;
            let source_ok = source.map_or(true, |s| s == raw.source_name);
            if raw.contract_name == contract && source_ok {
                matches.push(path);
            }
        }

        match matches.len() {
            0 => Err(ArtifactError::NotFound {
                name: name.to_string(),
                root: self.root.clone(),
            }),
            1 => load_artifact(&matches[0]),
            _ => Err(ArtifactError::Ambiguous {
                name: name.to_string(),
                paths: matches,
            }),
        }
    }

    fn collect_candidates(&self, dir: &Path, contract: &str, out: &mut Vec<PathBuf>) -> ArtifactResult<()> {
        let entries = fs::read_dir(dir).map_err(|source| ArtifactError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let wanted = format!("{}.json", contract);
        for entry in entries {
            let entry = entry.map_err(|source| ArtifactError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();

            if path.is_dir() {
                if path.file_name().map_or(false, |n| n == BUILD_INFO_DIR) {
                    continue;
                }
                self.collect_candidates(&path, contract, out)?;
            } else if path.file_name().map_or(false, |n| n == wanted.as_str()) {
                out.push(path);
            }
        }
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ArtifactResult<T> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
