//! Sources of candidate bundle files.
//!
//! Every source walks its own notion of "artifacts to package" and hands
//! each candidate file to a consumer. Sources do not look inside the files;
//! that is the job of the [`BundleInspector`](crate::BundleInspector).

use crate::error::ResolutionError;
use crate::project::{
    DependencyArtifact, DependencyNode, PLUGIN_ARTIFACT_TYPE, PluginDescriptor, ProjectModel,
    TreeProviders, TreeVisitor,
};
use crate::resolver::{Coordinate, DependencyResolver};
use crate::{DpError, DpResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Receives candidate files from a source.
pub type CandidateConsumer<'c> = dyn FnMut(&Path) -> DpResult<()> + 'c;

/// A producer of candidate bundle files.
pub trait ArtifactSource {
    /// Short description for log messages.
    fn describe(&self) -> String;

    /// Hand every candidate to the consumer, in order.
    ///
    /// An error from the consumer ends the walk and is returned as is.
    fn walk(&self, consumer: &mut CandidateConsumer<'_>) -> DpResult<()>;
}

/// Pick the source for the project's own contents: its dependency tree for
/// feature-like packaging, its primary output otherwise.
pub fn select_primary_source(
    project: &ProjectModel,
    trees: &TreeProviders,
) -> DpResult<Box<dyn ArtifactSource>> {
    if project.uses_dependency_tree() {
        let tree = trees.tree_for(project)?;
        return Ok(Box::new(TreeSource::new(tree)));
    }

    Ok(Box::new(SingleArtifactSource::new(project.artifact.clone())))
}

fn is_jar(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(".jar"))
        .unwrap_or(false)
}

// ============================================================================
// Single artifact
// ============================================================================

/// The project's primary output, when it is a jar.
#[derive(Debug, Clone)]
pub struct SingleArtifactSource {
    artifact: Option<PathBuf>,
}

impl SingleArtifactSource {
    #[must_use]
    pub fn new(artifact: Option<PathBuf>) -> Self {
        Self { artifact }
    }
}

impl ArtifactSource for SingleArtifactSource {
    fn describe(&self) -> String {
        "project artifact".to_string()
    }

    fn walk(&self, consumer: &mut CandidateConsumer<'_>) -> DpResult<()> {
        match &self.artifact {
            Some(artifact) if artifact.is_file() && is_jar(artifact) => {
                consumer(artifact.as_path())
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Dependency tree
// ============================================================================

/// The plugins of a feature/plugin dependency tree.
#[derive(Debug, Clone)]
pub struct TreeSource {
    tree: DependencyNode,
}

impl TreeSource {
    #[must_use]
    pub fn new(tree: DependencyNode) -> Self {
        Self { tree }
    }
}

impl ArtifactSource for TreeSource {
    fn describe(&self) -> String {
        "dependency tree".to_string()
    }

    fn walk(&self, consumer: &mut CandidateConsumer<'_>) -> DpResult<()> {
        self.tree.walk(&mut PluginVisitor { consumer })
    }
}

struct PluginVisitor<'a, 'c> {
    consumer: &'a mut CandidateConsumer<'c>,
}

impl TreeVisitor for PluginVisitor<'_, '_> {
    fn visit_feature(&mut self, _id: &str) -> bool {
        true
    }

    fn visit_plugin(&mut self, plugin: &PluginDescriptor) -> DpResult<()> {
        tracing::debug!("Considering artifact: {}", plugin.id);

        if !plugin.artifact_type.eq_ignore_ascii_case(PLUGIN_ARTIFACT_TYPE) {
            tracing::debug!("Not a JAR file -> {}", plugin.artifact_type);
            return Ok(());
        }

        let Some(location) = plugin.resolved_location() else {
            tracing::warn!("Unable to locate artifact: {}", plugin.id);
            return Ok(());
        };

        if !location.is_file() {
            tracing::warn!("Location '{}' is not a file", location.display());
            return Ok(());
        }

        (self.consumer)(location)
    }
}

// ============================================================================
// Explicit list
// ============================================================================

/// Explicitly listed artifacts, resolved in one batch.
pub struct ExplicitListSource<'r> {
    coordinates: Vec<Coordinate>,
    resolver: &'r dyn DependencyResolver,
}

impl<'r> ExplicitListSource<'r> {
    pub fn new(coordinates: Vec<Coordinate>, resolver: &'r dyn DependencyResolver) -> Self {
        Self {
            coordinates,
            resolver,
        }
    }
}

impl ArtifactSource for ExplicitListSource<'_> {
    fn describe(&self) -> String {
        format!("{} additional dependencies", self.coordinates.len())
    }

    fn walk(&self, consumer: &mut CandidateConsumer<'_>) -> DpResult<()> {
        if self.coordinates.is_empty() {
            return Ok(());
        }

        let files = self.resolver.resolve(&self.coordinates)?;
        if files.len() != self.coordinates.len() {
            let coordinate = self
                .coordinates
                .get(files.len())
                .unwrap_or(&self.coordinates[0]);
            return Err(ResolutionError::new(
                coordinate.to_string(),
                format!(
                    "resolver returned {} files for {} coordinates",
                    files.len(),
                    self.coordinates.len()
                ),
            )
            .into());
        }

        for (coordinate, file) in self.coordinates.iter().zip(&files) {
            tracing::debug!("Additional dependency: {} -> {}", coordinate, file.display());
            consumer(file.as_path())?;
        }

        Ok(())
    }
}

// ============================================================================
// Project dependencies
// ============================================================================

/// The project's direct dependencies, optionally limited to some scopes.
#[derive(Debug, Clone)]
pub struct DependencyArtifactsSource {
    artifacts: Vec<DependencyArtifact>,
    scopes: Option<BTreeSet<String>>,
}

impl DependencyArtifactsSource {
    /// All dependencies regardless of scope.
    #[must_use]
    pub fn all(artifacts: Vec<DependencyArtifact>) -> Self {
        Self {
            artifacts,
            scopes: None,
        }
    }

    /// Only dependencies in one of the given scopes.
    #[must_use]
    pub fn in_scopes(artifacts: Vec<DependencyArtifact>, scopes: BTreeSet<String>) -> Self {
        Self {
            artifacts,
            scopes: Some(scopes),
        }
    }

    fn includes(&self, artifact: &DependencyArtifact) -> bool {
        self.scopes
            .as_ref()
            .is_none_or(|scopes| scopes.contains(&artifact.scope))
    }
}

impl ArtifactSource for DependencyArtifactsSource {
    fn describe(&self) -> String {
        match &self.scopes {
            Some(scopes) => format!(
                "project dependencies ({})",
                scopes.iter().cloned().collect::<Vec<_>>().join(",")
            ),
            None => "project dependencies".to_string(),
        }
    }

    fn walk(&self, consumer: &mut CandidateConsumer<'_>) -> DpResult<()> {
        for artifact in self.artifacts.iter().filter(|a| self.includes(a)) {
            match &artifact.file {
                Some(file) => consumer(file.as_path())?,
                None => tracing::info!("Skipping {} because it has no file", artifact.id),
            }
        }
        Ok(())
    }
}

// ============================================================================
// Main artifact
// ============================================================================

/// The project's primary output, optionally required to exist.
#[derive(Debug, Clone)]
pub struct MainArtifactSource {
    artifact: Option<PathBuf>,
    required: bool,
}

impl MainArtifactSource {
    #[must_use]
    pub fn new(artifact: Option<PathBuf>, required: bool) -> Self {
        Self { artifact, required }
    }
}

impl ArtifactSource for MainArtifactSource {
    fn describe(&self) -> String {
        "main artifact".to_string()
    }

    fn walk(&self, consumer: &mut CandidateConsumer<'_>) -> DpResult<()> {
        match &self.artifact {
            Some(artifact) if artifact.is_file() => consumer(artifact.as_path()),
            _ if self.required => Err(DpError::MissingMainArtifact),
            _ => {
                tracing::debug!("No main artifact");
                Ok(())
            }
        }
    }
}
