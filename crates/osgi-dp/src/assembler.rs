//! Deployment package assembly.
//!
//! The [`PackageAssembler`] runs artifact sources through the
//! [`BundleInspector`], merges what they find, and writes the package.

use crate::config::DpConfig;
use crate::identity::BundleIdentity;
use crate::inspector::BundleInspector;
use crate::manifest::PackageManifest;
use crate::project::{BuildSession, ProjectModel};
use crate::source::ArtifactSource;
use crate::version::{VersionPurpose, package_version};
use crate::{DP_EXTENSION, DpError, DpResult, MANIFEST_DIR, MANIFEST_PATH};
use chrono::{DateTime, Datelike, Local, Timelike};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// The bundles collected for one package, keyed by archive entry name.
///
/// Entries keep the position of their first discovery; a later discovery of
/// the same entry name replaces the bundle and its source file.
#[derive(Debug, Default)]
pub struct PackageContents {
    entries: Vec<(BundleIdentity, PathBuf)>,
    index: HashMap<String, usize>,
}

impl PackageContents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bundle found at `source`.
    pub fn insert(&mut self, identity: BundleIdentity, source: PathBuf) {
        let name = identity.archive_entry_name();
        match self.index.get(&name) {
            Some(&position) => self.entries[position] = (identity, source),
            None => {
                self.index.insert(name, self.entries.len());
                self.entries.push((identity, source));
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(entry name, source file)` pairs in package order.
    #[must_use]
    pub fn files(&self) -> Vec<(String, PathBuf)> {
        self.entries
            .iter()
            .map(|(identity, source)| (identity.archive_entry_name(), source.clone()))
            .collect()
    }

    /// Describe the contents in a package manifest.
    #[must_use]
    pub fn to_manifest(&self, symbolic_name: &str, version: &str) -> PackageManifest {
        let mut manifest = PackageManifest::new(symbolic_name, version);
        for (identity, _) in &self.entries {
            manifest.put_entry(identity.clone());
        }
        manifest
    }
}

/// Outcome of a successful assembly.
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    /// The written package file.
    pub output: PathBuf,
    /// The manifest written into the package.
    pub manifest: PackageManifest,
    /// `(entry name, source file)` pairs in package order.
    pub files: Vec<(String, PathBuf)>,
}

/// Assembles deployment packages for one build session.
///
/// # Example
///
/// ```no_run
/// use osgi_dp::{BuildSession, DpConfig, PackageAssembler, ProjectModel, SingleArtifactSource};
///
/// let project: ProjectModel = toml::from_str(r#"
///     artifact_id = "myproj"
///     version = "1.0.0-SNAPSHOT"
///     artifact = "target/myproj.jar"
/// "#)?;
/// let config = DpConfig::default();
/// let session = BuildSession::now();
///
/// let source = SingleArtifactSource::new(project.artifact.clone());
/// let result = PackageAssembler::new(&config, &session).assemble(&project, &[&source])?;
/// println!("{}", result.output.display());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PackageAssembler<'a> {
    config: &'a DpConfig,
    session: &'a BuildSession,
    inspector: BundleInspector,
}

impl<'a> PackageAssembler<'a> {
    #[must_use]
    pub fn new(config: &'a DpConfig, session: &'a BuildSession) -> Self {
        Self {
            config,
            session,
            inspector: BundleInspector::new(),
        }
    }

    /// Collect bundles from the sources, in order, and write the package
    /// into the project's build directory.
    pub fn assemble(
        &self,
        project: &ProjectModel,
        sources: &[&dyn ArtifactSource],
    ) -> DpResult<AssemblyResult> {
        let dp_version =
            package_version(self.config, project, self.session, VersionPurpose::Manifest)?;
        tracing::info!("Building DP - Version: {}", dp_version);

        let contents = self.collect(sources)?;
        let manifest = contents.to_manifest(&project.artifact_id, &dp_version);

        let file_version =
            package_version(self.config, project, self.session, VersionPurpose::Filename)?;
        let output = project.build_directory.join(format!(
            "{}_{}.{}",
            project.artifact_id, file_version, DP_EXTENSION
        ));

        tracing::info!("Writing to: {}", output.display());
        fs::create_dir_all(&project.build_directory)?;

        let files = contents.files();
        write_package(&output, &manifest, &files)?;

        Ok(AssemblyResult {
            output,
            manifest,
            files,
        })
    }

    /// Run every source through the inspector into one set of contents.
    pub fn collect(&self, sources: &[&dyn ArtifactSource]) -> DpResult<PackageContents> {
        let mut contents = PackageContents::new();

        for source in sources {
            tracing::debug!("Collecting from {}", source.describe());
            source.walk(&mut |location: &Path| -> DpResult<()> {
                if let Some(identity) = self.inspector.inspect(location)? {
                    tracing::info!("Added: {}", identity);
                    contents.insert(identity, location.to_path_buf());
                }
                Ok(())
            })?;
        }

        Ok(contents)
    }
}

/// Write the package archive, removing the partial file if anything fails.
fn write_package(
    output: &Path,
    manifest: &PackageManifest,
    files: &[(String, PathBuf)],
) -> DpResult<()> {
    let write_error = |source: zip::result::ZipError| DpError::Write {
        path: output.to_path_buf(),
        source,
    };

    let file = File::create(output).map_err(|e| write_error(e.into()))?;
    let result = write_entries(file, manifest, files).map_err(write_error);

    if result.is_err() {
        if let Err(e) = fs::remove_file(output) {
            tracing::warn!("Failed to remove partial output {}: {}", output.display(), e);
        }
    }

    result
}

fn write_entries(
    file: File,
    manifest: &PackageManifest,
    files: &[(String, PathBuf)],
) -> Result<(), zip::result::ZipError> {
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // The manifest must come first for JAR readers
    zip.add_directory(MANIFEST_DIR, options)?;
    zip.start_file(MANIFEST_PATH, options)?;
    zip.write_all(manifest.to_text().as_bytes())?;

    for (name, source) in files {
        let metadata = fs::metadata(source)?;
        let mut entry_options = options.large_file(metadata.len() > u64::from(u32::MAX));
        if let Some(modified) = metadata.modified().ok().and_then(zip_time) {
            entry_options = entry_options.last_modified_time(modified);
        }

        zip.start_file(name.as_str(), entry_options)?;
        let mut input = File::open(source)?;
        io::copy(&mut input, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

/// Convert a file time into a zip timestamp in local time.
///
/// Times outside the DOS date range (before 1980) yield `None`.
fn zip_time(time: SystemTime) -> Option<zip::DateTime> {
    let local: DateTime<Local> = time.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        u8::try_from(local.month()).ok()?,
        u8::try_from(local.day()).ok()?,
        u8::try_from(local.hour()).ok()?,
        u8::try_from(local.minute()).ok()?,
        u8::try_from(local.second()).ok()?,
    )
    .ok()
}
