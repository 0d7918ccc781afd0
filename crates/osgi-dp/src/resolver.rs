//! Resolution of explicitly listed dependencies.

use crate::error::ResolutionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Coordinates of an artifact in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(rename = "type", default = "default_type")]
    pub artifact_type: String,
    #[serde(default)]
    pub classifier: Option<String>,
}

fn default_type() -> String {
    "jar".to_string()
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            artifact_type: default_type(),
            classifier: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// File extension used for this artifact type.
    #[must_use]
    pub fn extension(&self) -> &str {
        match self.artifact_type.as_str() {
            "" | "jar" | "bundle" | "eclipse-plugin" | "maven-plugin" | "test-jar" | "ejb" => "jar",
            other => other,
        }
    }
}

/// `group:artifact[:type[:classifier]]:version`
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        match &self.classifier {
            Some(classifier) if !classifier.is_empty() => {
                write!(f, ":{}:{}", self.artifact_type, classifier)?
            }
            _ if self.artifact_type != "jar" => write!(f, ":{}", self.artifact_type)?,
            _ => {}
        }
        write!(f, ":{}", self.version)
    }
}

/// Resolves a batch of coordinates to files.
///
/// Resolution is all or nothing: if any coordinate fails the whole batch fails.
pub trait DependencyResolver {
    fn resolve(&self, coordinates: &[Coordinate]) -> Result<Vec<PathBuf>, ResolutionError>;
}

/// Resolves coordinates against a repository directory in Maven layout.
#[derive(Debug, Clone)]
pub struct LocalRepositoryResolver {
    root: PathBuf,
}

impl LocalRepositoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of an artifact in the repository, whether or not it exists.
    #[must_use]
    pub fn path_of(&self, coordinate: &Coordinate) -> PathBuf {
        let mut path = self.root.clone();
        for segment in coordinate.group_id.split('.') {
            path.push(segment);
        }
        path.push(&coordinate.artifact_id);
        path.push(&coordinate.version);

        let file_name = match &coordinate.classifier {
            Some(classifier) if !classifier.is_empty() => format!(
                "{}-{}-{}.{}",
                coordinate.artifact_id,
                coordinate.version,
                classifier,
                coordinate.extension()
            ),
            _ => format!(
                "{}-{}.{}",
                coordinate.artifact_id,
                coordinate.version,
                coordinate.extension()
            ),
        };
        path.push(file_name);
        path
    }
}

impl DependencyResolver for LocalRepositoryResolver {
    fn resolve(&self, coordinates: &[Coordinate]) -> Result<Vec<PathBuf>, ResolutionError> {
        coordinates
            .iter()
            .map(|coordinate| {
                let path = self.path_of(coordinate);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(ResolutionError::new(
                        coordinate.to_string(),
                        format!("not found in {}", self.root.display()),
                    ))
                }
            })
            .collect()
    }
}
