//! Reading deployment packages back.
//!
//! The [`PackageReader`] opens a written `.dp` file, parses its manifest and
//! gives access to the bundles inside.

use crate::identity::BundleIdentity;
use crate::inspector::read_manifest;
use crate::manifest::{JarManifest, PackageManifest};
use crate::{DpError, DpResult, MANIFEST_PATH};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// Reader for deployment packages.
///
/// # Example
///
/// ```no_run
/// use osgi_dp::PackageReader;
///
/// let reader = PackageReader::open("target/myproj_1.0.0.dp")?;
/// for (name, identity) in reader.manifest().entries() {
///     println!("{name}: {identity}");
/// }
/// # Ok::<(), osgi_dp::DpError>(())
/// ```
#[derive(Debug)]
pub struct PackageReader {
    archive: ZipArchive<File>,
    manifest: PackageManifest,
}

impl PackageReader {
    /// Open a package file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> DpResult<Self> {
        let file = File::open(path.as_ref())?;
        let mut archive = ZipArchive::new(file)?;

        let text = {
            let mut entry = archive.by_name(MANIFEST_PATH).map_err(|_| {
                DpError::InvalidManifest(format!("{MANIFEST_PATH} not found in package"))
            })?;

            let mut text = String::new();
            entry.read_to_string(&mut text)?;
            text
        };

        let manifest = PackageManifest::from_jar_manifest(&JarManifest::parse(&text)?)?;

        Ok(Self { archive, manifest })
    }

    /// Get the package manifest.
    #[must_use]
    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// List all entries in the package, in archive order.
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i).map(String::from))
            .collect()
    }

    /// Check if an entry exists in the package.
    #[must_use]
    pub fn has_file(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Read an entry as bytes.
    pub fn read_file(&mut self, name: &str) -> DpResult<Vec<u8>> {
        let mut entry = self.archive.by_name(name)?;

        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read the identity from the manifest of a bundle stored in the package.
    ///
    /// Returns `Ok(None)` when the stored archive is not a bundle.
    pub fn bundle_identity(&mut self, name: &str) -> DpResult<Option<BundleIdentity>> {
        let contents = self.read_file(name)?;

        let Some(text) = read_manifest(Cursor::new(contents))? else {
            return Ok(None);
        };

        Ok(BundleIdentity::from_attributes(&JarManifest::parse(&text)?.main))
    }
}
