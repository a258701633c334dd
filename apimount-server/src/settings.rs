use apimount_core::{Result, ScanScope};
use serde::{Deserialize, Serialize};

/// Which packages are scanned for endpoints.
///
/// Blacklisted packages are skipped even when nested in a scanned package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoConfigSettings {
    pub packages_to_scan: Vec<String>,
    pub packages_to_blacklist: Vec<String>,
}

impl AutoConfigSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn scope(&self) -> ScanScope {
        ScanScope::new()
            .with_include(self.packages_to_scan.iter().cloned())
            .with_exclude(self.packages_to_blacklist.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_scan_everything() {
        let settings = AutoConfigSettings::from_json("{}").unwrap();
        assert!(settings.scope().matches("any.package"));
    }

    #[test]
    fn test_blacklist_inside_scanned_package() {
        let settings = AutoConfigSettings::from_json(
            r#"{"packages_to_scan":["com.acme"],"packages_to_blacklist":["com.acme.legacy"]}"#,
        )
        .unwrap();
        let scope = settings.scope();
        assert!(scope.matches("com.acme.api"));
        assert!(!scope.matches("com.acme.legacy.v0"));
        assert!(!scope.matches("org.other"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(AutoConfigSettings::from_json(r#"{"packages_to_scan":"x"}"#).is_err());
    }
}
