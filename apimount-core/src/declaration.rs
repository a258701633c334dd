use serde::{Deserialize, Serialize};

use crate::registry::{EMPTY_API_CONTEXT, EMPTY_API_VERSION};

fn default_version() -> String {
    EMPTY_API_VERSION.to_string()
}

fn default_contexts() -> Vec<String> {
    vec![EMPTY_API_CONTEXT.to_string()]
}

/// Symbolic placement of an endpoint: one version name and an ordered list of
/// context names, both resolved later against the registry.
///
/// The defaults are the sentinels, so an unqualified declaration resolves to `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointDeclaration {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default = "default_contexts")]
    contexts: Vec<String>,
}

impl EndpointDeclaration {
    pub fn new<I, S>(version: impl Into<String>, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EndpointDeclaration {
            version: version.into(),
            contexts: contexts.into_iter().map(Into::into).collect(),
        }
    }

    /// Declaration with a version and the empty context.
    pub fn version(version: impl Into<String>) -> Self {
        EndpointDeclaration {
            version: version.into(),
            contexts: default_contexts(),
        }
    }

    /// Declaration with no version and the given contexts.
    pub fn contexts<I, S>(contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(EMPTY_API_VERSION, contexts)
    }

    pub fn version_name(&self) -> &str {
        &self.version
    }

    pub fn context_names(&self) -> &[String] {
        &self.contexts
    }
}

impl Default for EndpointDeclaration {
    fn default() -> Self {
        EndpointDeclaration {
            version: default_version(),
            contexts: default_contexts(),
        }
    }
}
