//! Package version computation.
//!
//! The manifest of a deployment package always carries a qualified OSGi
//! version, while its file name uses the plain project version unless
//! configured otherwise.

use crate::config::DpConfig;
use crate::project::{BuildSession, ProjectModel};
use crate::{DpError, DpResult};
use std::fmt;
use std::str::FromStr;

/// Suffix replaced by the build timestamp when qualifying a version.
const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// An OSGi version: `major.minor.micro[.qualifier]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OsgiVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub qualifier: String,
}

impl OsgiVersion {
    /// Parse a version string.
    ///
    /// Missing numeric parts default to zero; an empty string is `0.0.0`.
    pub fn parse(version: &str) -> DpResult<Self> {
        let invalid = |reason: &str| DpError::InvalidVersion {
            version: version.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let mut parts = trimmed.splitn(4, '.');
        let mut numeric = |label: &str| -> DpResult<u32> {
            match parts.next() {
                None => Ok(0),
                Some(part) => part
                    .parse::<u32>()
                    .map_err(|_| invalid(&format!("{label} is not a number"))),
            }
        };

        let major = numeric("major")?;
        let minor = numeric("minor")?;
        let micro = numeric("micro")?;

        let qualifier = parts.next().unwrap_or_default();
        if qualifier.is_empty() && trimmed.matches('.').count() == 3 {
            return Err(invalid("qualifier is empty"));
        }
        if !qualifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid("qualifier contains invalid characters"));
        }

        Ok(Self {
            major,
            minor,
            micro,
            qualifier: qualifier.to_string(),
        })
    }
}

impl FromStr for OsgiVersion {
    type Err = DpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OsgiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

/// What a computed version will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPurpose {
    /// The `DeploymentPackage-Version` header.
    Manifest,
    /// The version part of the output file name.
    Filename,
}

/// Compute the package version for the given purpose.
///
/// | explicit version | qualified filename | purpose  | result            |
/// |------------------|--------------------|----------|-------------------|
/// | set              | any                | any      | explicit version  |
/// | unset            | true               | any      | qualified version |
/// | unset            | false              | manifest | qualified version |
/// | unset            | false              | filename | project version   |
pub fn package_version(
    config: &DpConfig,
    project: &ProjectModel,
    session: &BuildSession,
    purpose: VersionPurpose,
) -> DpResult<String> {
    if let Some(version) = &config.version {
        return Ok(version.clone());
    }

    if config.use_qualified_filename || purpose == VersionPurpose::Manifest {
        return qualified_version(project, session).map(|v| v.to_string());
    }

    Ok(project.version.clone())
}

/// Compute the qualified OSGi version of the project.
///
/// An expanded version reported by the build takes precedence. Otherwise a
/// `-SNAPSHOT` suffix on the project version is replaced by the session start
/// time in epoch seconds.
pub fn qualified_version(project: &ProjectModel, session: &BuildSession) -> DpResult<OsgiVersion> {
    if let Some(expanded) = &project.expanded_version {
        match OsgiVersion::parse(expanded) {
            Ok(version) => return Ok(version),
            Err(e) => tracing::debug!("Failed to use expanded version: {}", e),
        }
    }

    let version = match project.version.strip_suffix(SNAPSHOT_SUFFIX) {
        Some(base) => format!("{base}.{}", session.epoch_seconds()),
        None => project.version.clone(),
    };

    OsgiVersion::parse(&version)
}
