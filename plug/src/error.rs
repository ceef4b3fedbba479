use thiserror::Error;

use crate::descriptor::TypeKind;

/// The main error type for `fibre_plug` operations.
///
/// Every variant names the contract and/or implementation type involved so a
/// misconfiguration can be diagnosed without looking inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("contract `{contract}` is already registered")]
  DuplicateRegistration { contract: &'static str },

  #[error("contract `{contract}` is not registered")]
  NotRegistered { contract: &'static str },

  #[error("type `{type_name}` is not a valid {expected} type")]
  InvalidType {
    type_name: &'static str,
    expected: TypeKind,
  },

  #[error("`{implementation}` does not implement contract `{contract}`")]
  NotAssignableFrom {
    contract: &'static str,
    implementation: &'static str,
  },

  #[error(
    "resolving `{contract}` produced {}, expected an instance of `{expected}`",
    describe_found(.found)
  )]
  InvalidInstance {
    contract: &'static str,
    expected: &'static str,
    found: Option<&'static str>,
  },

  #[error("failed to construct `{implementation}`: {source}")]
  ConstructionFailure {
    implementation: &'static str,
    #[source]
    source: ConstructionError,
  },

  #[error("circular resolution detected while resolving `{contract}`")]
  CircularResolution { contract: &'static str },

  #[error("instance of `{implementation}` cannot be viewed as `{contract}`")]
  ContractCast {
    contract: &'static str,
    implementation: &'static str,
  },
}

/// Why the activator could not build an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
  #[error("no constructor is declared")]
  NoConstructor,

  #[error("missing argument #{position} of type `{expected}`")]
  MissingArgument {
    position: usize,
    expected: &'static str,
  },

  #[error("argument #{position} is `{found}`, expected `{expected}`")]
  ArgumentType {
    position: usize,
    expected: &'static str,
    found: &'static str,
  },
}

fn describe_found(found: &Option<&'static str>) -> String {
  match found {
    Some(found) => format!("an instance of `{found}`"),
    None => "no instance".to_string(),
  }
}

/// A specialized `Result` type for `fibre_plug` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
