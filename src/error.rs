//! Typed errors for the configuration build.

use crate::sql_map::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeResolutionError {
    #[error("type not found: '{type_name}'")]
    NotFound { type_name: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("sql map source not found: {kind} '{path}'")]
    NotFound { kind: ResourceKind, path: String },
    #[error("sql map source invalid: {kind} '{path}': {message}")]
    Invalid {
        kind: ResourceKind,
        path: String,
        message: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorConstructionError {
    #[error("unknown id generator type: '{0}'")]
    UnknownType(String),
    #[error("id generator property {property}='{value}': {reason}")]
    InvalidProperty {
        property: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderInitializationError {
    #[error("unknown db provider: '{0}'")]
    Unknown(String),
    #[error("db provider '{name}' misconfigured: {reason}")]
    Misconfigured { name: String, reason: String },
}

/// Raised when declarative options cannot be deserialized.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any failure that aborts a configuration build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    TypeResolution(#[from] TypeResolutionError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    GeneratorConstruction(#[from] GeneratorConstructionError),
    #[error(transparent)]
    ProviderInitialization(#[from] ProviderInitializationError),
    #[error("duplicate sql map scope: {0}")]
    DuplicateSqlMap(String),
}
