//! The build environment a deployment package is assembled in.
//!
//! These types describe what the host build knows about the project: its
//! identity and outputs, its direct dependencies, the dependency tree of
//! feature-like projects, and where finished packages are handed back to.

use crate::{DpError, DpResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Packaging types whose contents come from a dependency tree.
pub const TREE_PACKAGING_TYPES: &[&str] = &["eclipse-feature"];

/// Tree node type that denotes an executable bundle.
pub const PLUGIN_ARTIFACT_TYPE: &str = "eclipse-plugin";

/// Identity and outputs of the project being packaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectModel {
    /// Artifact id; doubles as the package symbolic name.
    pub artifact_id: String,

    /// Declared packaging type, e.g. `jar` or `eclipse-feature`.
    #[serde(default = "default_packaging")]
    pub packaging: String,

    /// Project version as declared, e.g. `1.0.0-SNAPSHOT`.
    pub version: String,

    /// Directory the package is written to.
    #[serde(default = "default_build_directory")]
    pub build_directory: PathBuf,

    /// Primary build output, if one was produced.
    #[serde(default)]
    pub artifact: Option<PathBuf>,

    /// Direct dependency artifacts.
    #[serde(default)]
    pub dependencies: Vec<DependencyArtifact>,

    /// Fully qualified version computed by the build, if it provides one.
    #[serde(default)]
    pub expanded_version: Option<String>,
}

fn default_packaging() -> String {
    "jar".to_string()
}

fn default_build_directory() -> PathBuf {
    PathBuf::from("target")
}

impl ProjectModel {
    /// Whether the packaging type is served by a dependency tree.
    #[must_use]
    pub fn uses_dependency_tree(&self) -> bool {
        TREE_PACKAGING_TYPES.contains(&self.packaging.as_str())
    }
}

/// A direct dependency of the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyArtifact {
    /// Display coordinate, used in log messages.
    pub id: String,

    #[serde(default = "default_scope")]
    pub scope: String,

    /// Resolved file; unresolved dependencies have none.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_scope() -> String {
    "compile".to_string()
}

/// The build session the package is assembled in.
#[derive(Debug, Clone, Copy)]
pub struct BuildSession {
    start_time: DateTime<Utc>,
}

impl BuildSession {
    #[must_use]
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self { start_time }
    }

    /// A session starting now.
    #[must_use]
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Session start as whole seconds since the Unix epoch.
    #[must_use]
    pub fn epoch_seconds(&self) -> i64 {
        self.start_time.timestamp()
    }
}

/// A node of a feature/plugin dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DependencyNode {
    /// A grouping of other features and plugins.
    Feature {
        id: String,
        #[serde(default)]
        children: Vec<DependencyNode>,
    },
    /// A leaf artifact.
    Plugin(PluginDescriptor),
}

/// A leaf of the dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub id: String,

    /// Declared artifact type; only `eclipse-plugin` entries are bundles.
    #[serde(rename = "type", default = "default_plugin_type")]
    pub artifact_type: String,

    /// Output of the workspace project that builds this plugin, if any.
    #[serde(default)]
    pub project_artifact: Option<PathBuf>,

    /// Declared location of the plugin.
    #[serde(default)]
    pub location: Option<PathBuf>,
}

fn default_plugin_type() -> String {
    PLUGIN_ARTIFACT_TYPE.to_string()
}

impl PluginDescriptor {
    /// Physical location, preferring the workspace project's output.
    #[must_use]
    pub fn resolved_location(&self) -> Option<&Path> {
        self.project_artifact
            .as_deref()
            .or(self.location.as_deref())
    }
}

/// Receives tree nodes during [`DependencyNode::walk`].
pub trait TreeVisitor {
    /// Called for each feature; returning `false` skips its children.
    fn visit_feature(&mut self, id: &str) -> bool;

    /// Called for each plugin; an error stops the walk.
    fn visit_plugin(&mut self, plugin: &PluginDescriptor) -> DpResult<()>;
}

impl DependencyNode {
    /// Depth-first walk in declaration order.
    pub fn walk(&self, visitor: &mut dyn TreeVisitor) -> DpResult<()> {
        match self {
            Self::Feature { id, children } => {
                if visitor.visit_feature(id) {
                    for child in children {
                        child.walk(visitor)?;
                    }
                }
                Ok(())
            }
            Self::Plugin(plugin) => visitor.visit_plugin(plugin),
        }
    }
}

/// Supplies the dependency tree of a feature-like project.
pub trait DependencyTreeProvider {
    fn dependency_tree(&self, project: &ProjectModel) -> DpResult<DependencyNode>;
}

/// A fixed tree serves every project it is asked about.
impl DependencyTreeProvider for DependencyNode {
    fn dependency_tree(&self, _project: &ProjectModel) -> DpResult<DependencyNode> {
        Ok(self.clone())
    }
}

/// Dependency tree providers keyed by packaging type.
#[derive(Default)]
pub struct TreeProviders {
    providers: BTreeMap<String, Box<dyn DependencyTreeProvider>>,
}

impl TreeProviders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for a packaging type.
    pub fn register(
        &mut self,
        packaging: impl Into<String>,
        provider: impl DependencyTreeProvider + 'static,
    ) {
        self.providers.insert(packaging.into(), Box::new(provider));
    }

    /// Fetch the tree for the project's packaging type.
    pub fn tree_for(&self, project: &ProjectModel) -> DpResult<DependencyNode> {
        let provider = self
            .providers
            .get(&project.packaging)
            .ok_or_else(|| DpError::UnknownPackaging(project.packaging.clone()))?;

        provider.dependency_tree(project)
    }
}

/// Where finished packages are handed back to the build.
pub trait BuildOutputs {
    /// Register the file as a secondary output with the given classifier.
    fn attach_artifact(&mut self, classifier: &str, path: &Path);

    /// Make the file the project's primary output.
    fn set_primary_artifact(&mut self, path: &Path);
}

/// [`BuildOutputs`] that records what it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordedOutputs {
    pub primary: Option<PathBuf>,
    pub attached: Vec<(String, PathBuf)>,
}

impl BuildOutputs for RecordedOutputs {
    fn attach_artifact(&mut self, classifier: &str, path: &Path) {
        tracing::info!("Attaching {} as '{}'", path.display(), classifier);
        self.attached.push((classifier.to_string(), path.to_path_buf()));
    }

    fn set_primary_artifact(&mut self, path: &Path) {
        tracing::info!("Setting primary artifact to {}", path.display());
        self.primary = Some(path.to_path_buf());
    }
}
