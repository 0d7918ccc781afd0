//! Extraction of bundle identities from candidate archives.

use crate::identity::BundleIdentity;
use crate::manifest::JarManifest;
use crate::{DpError, DpResult, MANIFEST_PATH};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

/// Reads bundle manifests and decides which archives are bundles.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleInspector;

impl BundleInspector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Inspect a candidate archive.
    ///
    /// Returns `Ok(None)` for archives that are not bundles: no manifest, or
    /// a manifest without `Bundle-SymbolicName`. An archive that cannot be
    /// opened or read is an error.
    pub fn inspect(&self, location: &Path) -> DpResult<Option<BundleIdentity>> {
        let process = |source: ZipError| DpError::Process {
            path: location.to_path_buf(),
            source,
        };

        let file = File::open(location).map_err(|e| process(e.into()))?;
        let Some(text) = read_manifest(file).map_err(process)? else {
            tracing::debug!("No Manifest: {}", location.display());
            return Ok(None);
        };

        let manifest = JarManifest::parse(&text).map_err(|e| {
            process(ZipError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            )))
        })?;

        let Some(identity) = BundleIdentity::from_attributes(&manifest.main) else {
            tracing::debug!("No BSN: {}", location.display());
            return Ok(None);
        };

        Ok(Some(identity))
    }
}

/// Read `META-INF/MANIFEST.MF` from an archive, if present.
///
/// The entry name is matched case-insensitively.
pub(crate) fn read_manifest<R: Read + Seek>(reader: R) -> Result<Option<String>, ZipError> {
    let mut archive = ZipArchive::new(reader)?;

    let index = (0..archive.len()).find(|&i| {
        archive
            .name_for_index(i)
            .is_some_and(|name| name.eq_ignore_ascii_case(MANIFEST_PATH))
    });
    let Some(index) = index else {
        return Ok(None);
    };

    let mut entry = archive.by_index(index)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;

    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}
