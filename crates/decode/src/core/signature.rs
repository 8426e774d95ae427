use alloy::primitives::{Selector, B256};
use alloy_dyn_abi::{DynSolType, Specifier};
use alloy_json_abi::{Event as EventAbi, Function};

use crate::error::Error;

/// A parameter of a resolved signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParam {
    /// The declared name, empty if the signature has none.
    pub name: String,
    /// The canonical ABI type string.
    pub ty: String,
    /// The resolved dynamic type.
    pub kind: DynSolType,
}

impl ResolvedParam {
    /// The declared name, or `param{position}` when the signature didn't name it.
    pub fn display_name(&self, position: usize) -> String {
        if self.name.is_empty() {
            format!("param{position}")
        } else {
            self.name.clone()
        }
    }
}

/// A function or event signature, parsed and resolved into decodable types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSignature {
    /// The function or event name.
    pub name: String,
    /// The canonical signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
    /// Parameters in declaration order.
    pub inputs: Vec<ResolvedParam>,
}

impl ResolvedSignature {
    /// Parses a function signature. Both canonical (`transfer(address,uint256)`) and
    /// human-readable (`transfer(address to, uint256 amount)`) forms are accepted, with or
    /// without the `function` keyword.
    pub fn parse_function(signature: &str) -> Result<(Selector, Self), Error> {
        let function = Function::parse(signature.trim()).map_err(|e| invalid(signature, e))?;

        let inputs = function
            .inputs
            .iter()
            .map(|param| {
                Ok(ResolvedParam {
                    name: param.name.clone(),
                    ty: param.selector_type().into_owned(),
                    kind: param.resolve().map_err(|e| invalid(signature, e))?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok((
            function.selector(),
            Self { name: function.name.clone(), signature: function.signature(), inputs },
        ))
    }

    /// Parses an event signature, with or without the `event` keyword. `indexed` markers are
    /// accepted but topics are always assigned to parameters in declaration order.
    pub fn parse_event(signature: &str) -> Result<(B256, Self), Error> {
        let event = EventAbi::parse(signature.trim()).map_err(|e| invalid(signature, e))?;

        let inputs = event
            .inputs
            .iter()
            .map(|param| {
                Ok(ResolvedParam {
                    name: param.name.clone(),
                    ty: param.selector_type().into_owned(),
                    kind: param.resolve().map_err(|e| invalid(signature, e))?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok((event.selector(), Self { name: event.name.clone(), signature: event.signature(), inputs }))
    }

    /// The resolved types of all parameters.
    pub fn types(&self) -> Vec<DynSolType> {
        self.inputs.iter().map(|param| param.kind.clone()).collect()
    }
}

fn invalid(signature: &str, e: impl std::fmt::Display) -> Error {
    Error::InvalidSignature { signature: signature.to_string(), reason: e.to_string() }
}
