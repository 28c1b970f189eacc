//! Build metadata exposed through `x509_build_info`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_VERSION: &str = "1.0.0-snapshot";
const UNKNOWN: &str = "unknown";

/// Version and provenance of the running build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// `APP_VERSION`
    pub version: String,
    /// `APP_BUILD_REF`
    pub git_ref: String,
    /// `APP_BUILD_DATE`
    pub build_date: String,
    /// `APP_BUILD_SHA`
    pub sha: String,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            git_ref: UNKNOWN.to_string(),
            build_date: UNKNOWN.to_string(),
            sha: UNKNOWN.to_string(),
        }
    }
}

impl BuildInfo {
    /// Read build metadata from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Read build metadata from explicit variables. Empty values count as unset.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .collect();
        let get = |key: &str, default: &str| {
            vars.get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            version: get("APP_VERSION", DEFAULT_VERSION),
            git_ref: get("APP_BUILD_REF", UNKNOWN),
            build_date: get("APP_BUILD_DATE", UNKNOWN),
            sha: get("APP_BUILD_SHA", UNKNOWN),
        }
    }
}
