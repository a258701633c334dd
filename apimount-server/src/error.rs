use apimount_core::{AutoconfigError, EndpointId};

/// Failures while assembling and binding servers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Autoconfig(#[from] AutoconfigError),

    #[error("Failed to instantiate endpoint {id}: {message}")]
    Instantiation { id: EndpointId, message: String },

    #[error("Failed to bind server {name}: {message}")]
    Bind { name: String, message: String },
}

impl ServerError {
    pub fn instantiation(id: &EndpointId, message: impl Into<String>) -> Self {
        ServerError::Instantiation {
            id: id.clone(),
            message: message.into(),
        }
    }

    pub fn bind(name: impl Into<String>, message: impl Into<String>) -> Self {
        ServerError::Bind {
            name: name.into(),
            message: message.into(),
        }
    }
}
