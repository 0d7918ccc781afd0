//! Project descriptor parsing

use anyhow::{Context, Result};
use osgi_dp::{DependencyNode, ProjectModel, TreeProviders};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A project descriptor file: what the build knows about the project.
///
/// ```toml
/// [project]
/// artifact_id = "myproj"
/// version = "1.0.0-SNAPSHOT"
/// artifact = "target/myproj.jar"
///
/// [[project.dependencies]]
/// id = "org.example:util:1.2.0"
/// file = "lib/util-1.2.0.jar"
///
/// [tree]
/// kind = "feature"
/// id = "myproj"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub project: ProjectModel,

    /// Dependency tree, registered for the project's packaging.
    #[serde(default)]
    pub tree: Option<DependencyNode>,
}

impl Descriptor {
    /// Load a descriptor from a file; relative paths are taken relative to
    /// the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project descriptor: {:?}", path))?;

        let mut descriptor = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            descriptor.resolve_paths(base);
        }
        Ok(descriptor)
    }

    /// Parse a descriptor from a string
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse project descriptor")
    }

    /// Tree providers serving this descriptor's tree, if it has one.
    pub fn tree_providers(&self) -> TreeProviders {
        let mut trees = TreeProviders::new();
        if let Some(tree) = &self.tree {
            trees.register(self.project.packaging.clone(), tree.clone());
        }
        trees
    }

    fn resolve_paths(&mut self, base: &Path) {
        let project = &mut self.project;
        resolve(base, &mut project.build_directory);
        if let Some(artifact) = &mut project.artifact {
            resolve(base, artifact);
        }
        for dependency in &mut project.dependencies {
            if let Some(file) = &mut dependency.file {
                resolve(base, file);
            }
        }
        if let Some(tree) = &mut self.tree {
            resolve_tree(base, tree);
        }
    }
}

fn resolve(base: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

fn resolve_tree(base: &Path, node: &mut DependencyNode) {
    match node {
        DependencyNode::Feature { children, .. } => {
            for child in children {
                resolve_tree(base, child);
            }
        }
        DependencyNode::Plugin(plugin) => {
            for path in [&mut plugin.project_artifact, &mut plugin.location]
                .into_iter()
                .flatten()
            {
                resolve(base, path);
            }
        }
    }
}
