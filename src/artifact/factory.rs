//! Contract factory: creation code plus ABI-encoded constructor arguments.

use std::sync::Arc;

use alloy::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy::primitives::Bytes;

use crate::artifact::hardhat::ContractArtifact;
use crate::artifact::{ArtifactError, ArtifactResult};

/// Template bound to one compiled contract.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    artifact: Arc<ContractArtifact>,
}

impl ContractFactory {
    pub fn new(artifact: ContractArtifact) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    pub fn contract_name(&self) -> &str {
        &self.artifact.name
    }

    /// Constructor parameter types declared in the ABI.
    pub fn constructor_types(&self) -> ArtifactResult<Vec<DynSolType>> {
        let Some(constructor) = &self.artifact.abi.constructor else {
            return Ok(Vec::new());
        };
        constructor
            .inputs
            .iter()
            .map(|param| {
                param.resolve().map_err(|e| ArtifactError::Abi {
                    name: self.artifact.name.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// ABI-encode constructor arguments after checking them against the ABI.
    pub fn encode_constructor_args(&self, args: &[DynSolValue]) -> ArtifactResult<Bytes> {
        let types = self.constructor_types()?;
        if types.len() != args.len() {
            return Err(ArtifactError::ConstructorArity {
                name: self.artifact.name.clone(),
                expected: types.len(),
                actual: args.len(),
            });
        }
        for (index, (ty, value)) in types.iter().zip(args).enumerate() {
            if !ty.matches(value) {
                return Err(ArtifactError::ConstructorType {
                    name: self.artifact.name.clone(),
                    index,
                    expected: ty.sol_type_name().into_owned(),
                });
            }
        }

        if args.is_empty() {
            return Ok(Bytes::new());
        }
        Ok(DynSolValue::Tuple(args.to_vec()).abi_encode_params().into())
    }

    /// Creation transaction input: bytecode followed by encoded arguments.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> ArtifactResult<Bytes> {
        let encoded = self.encode_constructor_args(args)?;
        let mut code = self.artifact.bytecode.to_vec();
        code.extend_from_slice(&encoded);
        Ok(code.into())
    }
}
