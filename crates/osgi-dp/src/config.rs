//! Deployment package configuration

use crate::DpResult;
use crate::resolver::Coordinate;
use crate::version::OsgiVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Settings for one packaging run.
///
/// Read once at the start of a run and never modified while assembling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpConfig {
    /// Use the qualified OSGi version in the file name instead of the
    /// project version.
    pub use_qualified_filename: bool,

    /// Skip generation of the package entirely.
    pub skip: bool,

    /// Attach the package to the build as a secondary output.
    pub attach: bool,

    /// Fail when the primary output is missing (bundle mode only).
    pub fail_on_missing_main_artifact: bool,

    /// Only package the additional dependencies, not the project's own
    /// (bundle mode only).
    pub ignore_project_dependencies: bool,

    /// Dependency scopes included in the package (bundle mode only).
    pub included_scopes: BTreeSet<String>,

    /// Extra artifacts to resolve and package.
    pub additional_dependencies: Vec<Coordinate>,

    /// Explicit package version, overriding the project version.
    ///
    /// Must be a valid OSGi version; stored in normalized form.
    pub version: Option<String>,
}

fn default_included_scopes() -> BTreeSet<String> {
    ["compile", "runtime"].into_iter().map(String::from).collect()
}

impl Default for DpConfig {
    fn default() -> Self {
        Self {
            use_qualified_filename: false,
            skip: false,
            attach: true,
            fail_on_missing_main_artifact: true,
            ignore_project_dependencies: false,
            included_scopes: default_included_scopes(),
            additional_dependencies: Vec::new(),
            version: None,
        }
    }
}

impl DpConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML; the explicit version is validated.
    pub fn from_toml_str(content: &str) -> DpResult<Self> {
        let config: Self = toml::from_str(content)?;
        match config.version.clone() {
            Some(version) => config.with_version(&version),
            None => Ok(config),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> DpResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Set the explicit version after validating it as an OSGi version.
    pub fn with_version(mut self, version: &str) -> DpResult<Self> {
        self.version = Some(OsgiVersion::parse(version)?.to_string());
        Ok(self)
    }
}
