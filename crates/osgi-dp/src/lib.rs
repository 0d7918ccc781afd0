//! OSGi deployment package assembly
//!
//! This crate builds `.dp` deployment packages: JAR-format archives that carry
//! a set of OSGi bundles plus a manifest describing the package and each
//! bundle in it.
//!
//! # Package Structure
//!
//! ```text
//! myproj_1.0.0.dp
//! ├── META-INF/
//! │   └── MANIFEST.MF                 # package identity + one section per bundle
//! ├── com.example.app_1.0.0.jar
//! └── com.example.util_2.1.0.jar
//! ```
//!
//! Candidate files come from [`ArtifactSource`]s, the [`BundleInspector`]
//! keeps only real bundles, and the [`PackageAssembler`] writes the archive.
//! A [`Mode`] bundles the usual source selections and decides what happens to
//! the finished package.
//!
//! # Example
//!
//! ```no_run
//! use osgi_dp::{BuildContext, BuildSession, DpConfig, LocalRepositoryResolver, Mode};
//! use osgi_dp::{ProjectModel, RecordedOutputs, TreeProviders, run};
//!
//! let project: ProjectModel = toml::from_str(r#"
//!     artifact_id = "myproj"
//!     version = "1.0.0"
//!     artifact = "target/myproj.jar"
//! "#)?;
//! let config = DpConfig::default();
//! let session = BuildSession::now();
//! let resolver = LocalRepositoryResolver::new("/home/me/.m2/repository");
//! let trees = TreeProviders::new();
//! let ctx = BuildContext { project: &project, session: &session, resolver: &resolver, trees: &trees };
//!
//! let mut outputs = RecordedOutputs::default();
//! if let Some(result) = run(Mode::Package.policy(&config).as_ref(), &config, &ctx, &mut outputs)? {
//!     println!("{}", result.output.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod identity;
mod inspector;
mod manifest;

pub mod assembler;
pub mod config;
pub mod mode;
pub mod project;
pub mod reader;
pub mod resolver;
pub mod source;
pub mod version;

#[cfg(test)]
mod test_support;

pub use assembler::{AssemblyResult, PackageAssembler, PackageContents};
pub use config::DpConfig;
pub use error::{DpError, ResolutionError};
pub use identity::BundleIdentity;
pub use inspector::BundleInspector;
pub use manifest::{Attributes, JarManifest, PackageManifest};
pub use mode::{BuildContext, BuildMode, BundleMode, Mode, ModePolicy, PackageMode, run};
pub use project::{
    BuildOutputs, BuildSession, DependencyArtifact, DependencyNode, DependencyTreeProvider,
    PluginDescriptor, ProjectModel, RecordedOutputs, TreeProviders, TreeVisitor,
};
pub use reader::PackageReader;
pub use resolver::{Coordinate, DependencyResolver, LocalRepositoryResolver};
pub use source::{
    ArtifactSource, DependencyArtifactsSource, ExplicitListSource, MainArtifactSource,
    SingleArtifactSource, TreeSource,
};
pub use version::{OsgiVersion, VersionPurpose};

/// Result type for deployment package operations.
pub type DpResult<T> = Result<T, DpError>;

/// Deployment package file extension.
pub const DP_EXTENSION: &str = "dp";

/// Classifier used when a package is attached to the build.
pub const DP_CLASSIFIER: &str = "dp";

/// Manifest directory entry within an archive.
pub const MANIFEST_DIR: &str = "META-INF/";

/// Manifest file name within an archive.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Manifest format version header.
pub const MANIFEST_VERSION: &str = "Manifest-Version";

/// Value written for [`MANIFEST_VERSION`] in package manifests.
pub const MANIFEST_VERSION_VALUE: &str = "1";

pub const DP_SYMBOLIC_NAME: &str = "DeploymentPackage-SymbolicName";
pub const DP_VERSION: &str = "DeploymentPackage-Version";
pub const BUNDLE_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
pub const BUNDLE_VERSION: &str = "Bundle-Version";
