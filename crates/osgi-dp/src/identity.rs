//! Identity of a single bundle inside a deployment package.

use crate::manifest::Attributes;
use crate::{BUNDLE_SYMBOLIC_NAME, BUNDLE_VERSION};
use std::fmt;

/// Symbolic name and version of a packaged bundle.
///
/// The symbolic name is stored without directives: a header value of
/// `com.example.app;singleton:=true` is kept as `com.example.app`. The version
/// is opaque and may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleIdentity {
    symbolic_name: String,
    version: Option<String>,
}

impl BundleIdentity {
    /// Build an identity from raw header values.
    ///
    /// Returns `None` when nothing remains of the symbolic name once its
    /// directives are stripped.
    #[must_use]
    pub fn new(symbolic_name: &str, version: Option<&str>) -> Option<Self> {
        let symbolic_name = symbolic_name
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        if symbolic_name.is_empty() {
            return None;
        }

        Some(Self {
            symbolic_name: symbolic_name.to_string(),
            version: version.map(str::to_string),
        })
    }

    /// Read the identity from the main section of a bundle manifest.
    #[must_use]
    pub fn from_attributes(attributes: &Attributes) -> Option<Self> {
        let symbolic_name = attributes.get(BUNDLE_SYMBOLIC_NAME)?;
        Self::new(symbolic_name, attributes.get(BUNDLE_VERSION))
    }

    #[must_use]
    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Name of the entry this bundle occupies in the package,
    /// `<symbolic name>_<version>.jar`.
    ///
    /// A missing version renders as `null`.
    #[must_use]
    pub fn archive_entry_name(&self) -> String {
        format!("{}_{}.jar", self.symbolic_name, self.version_or_null())
    }

    /// Per-entry manifest section describing this bundle.
    #[must_use]
    pub fn to_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(BUNDLE_SYMBOLIC_NAME, &self.symbolic_name);
        if let Some(version) = &self.version {
            attributes.insert(BUNDLE_VERSION, version);
        }
        attributes
    }

    fn version_or_null(&self) -> &str {
        self.version.as_deref().unwrap_or("null")
    }
}

impl fmt::Display for BundleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbolic_name, self.version_or_null())
    }
}
