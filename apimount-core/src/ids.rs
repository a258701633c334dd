use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a discovered endpoint type (for example a fully qualified
/// type name). Classification treats it as opaque data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    pub fn new(value: impl Into<String>) -> Self {
        EndpointId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `::` or `.` separated segment, used in log lines.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit([':', '.']).next().unwrap_or(&self.0)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(value: &str) -> Self {
        EndpointId::new(value)
    }
}

impl From<String> for EndpointId {
    fn from(value: String) -> Self {
        EndpointId(value)
    }
}
