use serde::{Deserialize, Serialize};
use std::fmt;

use crate::registry::SymbolKind;

/// Coarse classification of an [`AutoconfigError`], stable for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnresolvedSymbol,
    InvalidFragment,
    MissingRequiredDependency,
    InvalidManifest,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::UnresolvedSymbol => "unresolved_symbol",
            ErrorKind::InvalidFragment => "invalid_fragment",
            ErrorKind::MissingRequiredDependency => "missing_required_dependency",
            ErrorKind::InvalidManifest => "invalid_manifest",
        };
        write!(f, "{}", s)
    }
}

/// Errors raised while resolving, classifying or assembling configuration.
///
/// None of these are retried: each one points at a programming or
/// packaging mistake that has to be fixed at the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutoconfigError {
    /// A version or context name has no registered entry.
    ///
    /// `requested` holds every name of the same kind that the declaration
    /// asked for, so the message shows the full context list.
    #[error("{}", unresolved_message(*kind, name, requested))]
    UnresolvedSymbol {
        kind: SymbolKind,
        name: String,
        requested: Vec<String>,
    },

    #[error("Invalid configuration fragment: {0}")]
    InvalidFragment(String),

    #[error("Missing required dependency: {0}")]
    MissingRequiredDependency(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

fn unresolved_message(kind: SymbolKind, name: &str, requested: &[String]) -> String {
    match kind {
        SymbolKind::Version => format!(
            "Unable to resolve api version information from the endpoint declaration for value: {}",
            name
        ),
        SymbolKind::Context => format!(
            "Unable to resolve api context information from the endpoint declaration for value: {}. \
             The declaration contains the following contexts to resolve: {}",
            name,
            requested.join(",")
        ),
    }
}

impl AutoconfigError {
    pub fn unresolved_version(name: impl Into<String>) -> Self {
        let name = name.into();
        AutoconfigError::UnresolvedSymbol {
            kind: SymbolKind::Version,
            requested: vec![name.clone()],
            name,
        }
    }

    pub fn unresolved_context(name: impl Into<String>, requested: &[String]) -> Self {
        AutoconfigError::UnresolvedSymbol {
            kind: SymbolKind::Context,
            name: name.into(),
            requested: requested.to_vec(),
        }
    }

    pub fn invalid_fragment(message: impl Into<String>) -> Self {
        AutoconfigError::InvalidFragment(message.into())
    }

    pub fn missing_dependency(message: impl Into<String>) -> Self {
        AutoconfigError::MissingRequiredDependency(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AutoconfigError::UnresolvedSymbol { .. } => ErrorKind::UnresolvedSymbol,
            AutoconfigError::InvalidFragment(_) => ErrorKind::InvalidFragment,
            AutoconfigError::MissingRequiredDependency(_) => ErrorKind::MissingRequiredDependency,
            AutoconfigError::InvalidManifest(_) => ErrorKind::InvalidManifest,
        }
    }
}

impl From<serde_json::Error> for AutoconfigError {
    fn from(err: serde_json::Error) -> Self {
        AutoconfigError::InvalidManifest(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AutoconfigError>;
