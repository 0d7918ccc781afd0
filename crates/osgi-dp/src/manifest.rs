//! JAR manifest parsing and serialization.
//!
//! Both bundles and deployment packages describe themselves through a
//! `META-INF/MANIFEST.MF` file. The format is a sequence of sections made of
//! `Name: value` headers; the first section is the main section, every other
//! section starts with a `Name` header naming the archive entry it describes.

use crate::identity::BundleIdentity;
use crate::{
    DP_SYMBOLIC_NAME, DP_VERSION, DpError, DpResult, MANIFEST_VERSION, MANIFEST_VERSION_VALUE,
};

/// Maximum length of a physical manifest line in bytes, excluding the line break.
const MAX_LINE_LENGTH: usize = 72;

/// Header that opens a per-entry section.
const SECTION_NAME: &str = "Name";

/// An ordered set of manifest headers.
///
/// Header names compare case-insensitively, as they do in the JAR format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    headers: Vec<(String, String)>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a header value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, replacing an existing value in place.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// A parsed `MANIFEST.MF` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarManifest {
    /// Main section headers.
    pub main: Attributes,
    /// Per-entry sections, keyed by entry name, in file order.
    pub sections: Vec<(String, Attributes)>,
}

impl JarManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest text.
    ///
    /// Accepts `\r\n`, `\n` and `\r` line breaks and continuation lines that
    /// start with a single space.
    pub fn parse(text: &str) -> DpResult<Self> {
        let mut manifest = Self::new();
        let mut current: Option<(String, Attributes)> = None;
        let mut in_main = true;

        for (line_no, line) in logical_lines(text) {
            if line.is_empty() {
                // Section boundary
                if let Some(section) = current.take() {
                    manifest.sections.push(section);
                }
                in_main = false;
                continue;
            }

            let (name, value) = split_header(&line).ok_or_else(|| {
                DpError::InvalidManifest(format!("line {line_no}: expected 'Name: value'"))
            })?;

            if in_main {
                manifest.main.insert(name, value);
                continue;
            }

            match current.as_mut() {
                Some((_, attributes)) => attributes.insert(name, value),
                None if name.eq_ignore_ascii_case(SECTION_NAME) => {
                    current = Some((value.to_string(), Attributes::new()));
                }
                None => {
                    return Err(DpError::InvalidManifest(format!(
                        "line {line_no}: section does not start with a Name header"
                    )));
                }
            }
        }

        if let Some(section) = current.take() {
            manifest.sections.push(section);
        }

        Ok(manifest)
    }

    /// Look up a per-entry section by entry name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Attributes> {
        self.sections
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, attributes)| attributes)
    }

    /// Serialize to manifest text.
    ///
    /// `Manifest-Version` is always written first in the main section. Lines
    /// end in `\r\n` and are wrapped at 72 bytes.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        if let Some(version) = self.main.get(MANIFEST_VERSION) {
            write_header(&mut out, MANIFEST_VERSION, version);
        }
        for (name, value) in self.main.iter() {
            if !name.eq_ignore_ascii_case(MANIFEST_VERSION) {
                write_header(&mut out, name, value);
            }
        }
        out.push_str("\r\n");

        for (entry, attributes) in &self.sections {
            write_header(&mut out, SECTION_NAME, entry);
            for (name, value) in attributes.iter() {
                write_header(&mut out, name, value);
            }
            out.push_str("\r\n");
        }

        out
    }
}

/// The manifest of a deployment package.
///
/// Records the package's own identity and one section per contained bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    symbolic_name: String,
    version: String,
    entries: Vec<(String, BundleIdentity)>,
}

impl PackageManifest {
    /// Create an empty package manifest.
    pub fn new(symbolic_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            version: version.into(),
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Contained bundles, keyed by archive entry name, in package order.
    #[must_use]
    pub fn entries(&self) -> &[(String, BundleIdentity)] {
        &self.entries
    }

    /// Record a bundle, replacing an entry of the same name in place.
    pub fn put_entry(&mut self, identity: BundleIdentity) {
        let name = identity.archive_entry_name();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = identity,
            None => self.entries.push((name, identity)),
        }
    }

    /// Convert into the generic manifest representation.
    #[must_use]
    pub fn to_jar_manifest(&self) -> JarManifest {
        let mut manifest = JarManifest::new();
        manifest.main.insert(MANIFEST_VERSION, MANIFEST_VERSION_VALUE);
        manifest.main.insert(DP_SYMBOLIC_NAME, &self.symbolic_name);
        manifest.main.insert(DP_VERSION, &self.version);

        manifest.sections = self
            .entries
            .iter()
            .map(|(name, identity)| (name.clone(), identity.to_attributes()))
            .collect();

        manifest
    }

    /// Read a package manifest back from its generic representation.
    pub fn from_jar_manifest(manifest: &JarManifest) -> DpResult<Self> {
        let symbolic_name = manifest.main.get(DP_SYMBOLIC_NAME).ok_or_else(|| {
            DpError::InvalidManifest(format!("missing {DP_SYMBOLIC_NAME} header"))
        })?;
        let version = manifest
            .main
            .get(DP_VERSION)
            .ok_or_else(|| DpError::InvalidManifest(format!("missing {DP_VERSION} header")))?;

        let mut package = Self::new(symbolic_name, version);
        for (name, attributes) in &manifest.sections {
            let identity = BundleIdentity::from_attributes(attributes).ok_or_else(|| {
                DpError::InvalidManifest(format!("entry '{name}' has no bundle symbolic name"))
            })?;
            package.entries.push((name.clone(), identity));
        }

        Ok(package)
    }

    /// Serialize to `MANIFEST.MF` text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_jar_manifest().to_text()
    }
}

/// Join continuation lines, yielding `(first physical line number, text)`.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (index, physical) in normalized.split('\n').enumerate() {
        match (physical.strip_prefix(' '), lines.last_mut()) {
            (Some(rest), Some((_, last))) if !last.is_empty() => last.push_str(rest),
            _ => lines.push((index + 1, physical.to_string())),
        }
    }

    // A trailing line break leaves one empty line behind
    while lines.last().is_some_and(|(_, line)| line.is_empty()) {
        lines.pop();
    }

    lines
}

fn split_header(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.strip_prefix(' ').unwrap_or(value)))
}

/// Append one header, wrapping it onto continuation lines as needed.
fn write_header(out: &mut String, name: &str, value: &str) {
    let line = format!("{name}: {value}");
    let mut rest = line.as_str();
    let mut limit = MAX_LINE_LENGTH;

    loop {
        if rest.len() <= limit {
            out.push_str(rest);
            out.push_str("\r\n");
            return;
        }

        let mut split = limit;
        while !rest.is_char_boundary(split) {
            split -= 1;
        }

        out.push_str(&rest[..split]);
        out.push_str("\r\n ");
        rest = &rest[split..];
        // The leading space counts towards the continuation line
        limit = MAX_LINE_LENGTH - 1;
    }
}
