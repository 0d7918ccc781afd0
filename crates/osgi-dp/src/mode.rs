//! Packaging modes.
//!
//! A mode decides which sources make up a package and what happens to the
//! package once it is written:
//!
//! | mode      | sources                                                        | disposal                 |
//! |-----------|----------------------------------------------------------------|--------------------------|
//! | `build`   | project contents, additional dependencies                      | attach as `dp` if enabled |
//! | `bundle`  | project contents, additional dependencies, scoped dependencies, main artifact | attach as `dp` if enabled |
//! | `package` | project contents, additional dependencies, all dependencies    | becomes the primary output |

use crate::assembler::{AssemblyResult, PackageAssembler};
use crate::config::DpConfig;
use crate::project::{BuildOutputs, BuildSession, ProjectModel, TreeProviders};
use crate::resolver::DependencyResolver;
use crate::source::{
    ArtifactSource, DependencyArtifactsSource, ExplicitListSource, MainArtifactSource,
    select_primary_source,
};
use crate::{DP_CLASSIFIER, DpResult};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Everything a run needs to know about the surrounding build.
pub struct BuildContext<'a> {
    pub project: &'a ProjectModel,
    pub session: &'a BuildSession,
    pub resolver: &'a dyn DependencyResolver,
    pub trees: &'a TreeProviders,
}

/// Source selection and disposal for one packaging mode.
pub trait ModePolicy {
    fn name(&self) -> &'static str;

    /// The sources to run, in order; later sources win on name collisions.
    fn sources<'a>(
        &self,
        ctx: &BuildContext<'a>,
        config: &DpConfig,
    ) -> DpResult<Vec<Box<dyn ArtifactSource + 'a>>>;

    /// Hand the finished package back to the build.
    fn dispose(&self, output: &Path, outputs: &mut dyn BuildOutputs);
}

/// Sources shared by every mode: the project's own contents followed by the
/// additional dependencies.
fn common_sources<'a>(
    ctx: &BuildContext<'a>,
    config: &DpConfig,
) -> DpResult<Vec<Box<dyn ArtifactSource + 'a>>> {
    let mut sources: Vec<Box<dyn ArtifactSource + 'a>> = Vec::new();
    sources.push(select_primary_source(ctx.project, ctx.trees)?);
    sources.push(Box::new(ExplicitListSource::new(
        config.additional_dependencies.clone(),
        ctx.resolver,
    )));
    Ok(sources)
}

/// Package the project's contents and attach the package to the build.
#[derive(Debug, Clone)]
pub struct BuildMode {
    pub attach: bool,
}

impl ModePolicy for BuildMode {
    fn name(&self) -> &'static str {
        "build"
    }

    fn sources<'a>(
        &self,
        ctx: &BuildContext<'a>,
        config: &DpConfig,
    ) -> DpResult<Vec<Box<dyn ArtifactSource + 'a>>> {
        common_sources(ctx, config)
    }

    fn dispose(&self, output: &Path, outputs: &mut dyn BuildOutputs) {
        if self.attach {
            outputs.attach_artifact(DP_CLASSIFIER, output);
        }
    }
}

/// Package the project together with its dependencies and main artifact.
#[derive(Debug, Clone)]
pub struct BundleMode {
    pub attach: bool,
    pub fail_on_missing_main_artifact: bool,
    pub ignore_project_dependencies: bool,
    pub included_scopes: BTreeSet<String>,
}

impl ModePolicy for BundleMode {
    fn name(&self) -> &'static str {
        "bundle"
    }

    fn sources<'a>(
        &self,
        ctx: &BuildContext<'a>,
        config: &DpConfig,
    ) -> DpResult<Vec<Box<dyn ArtifactSource + 'a>>> {
        let mut sources = common_sources(ctx, config)?;

        if !self.ignore_project_dependencies {
            sources.push(Box::new(DependencyArtifactsSource::in_scopes(
                ctx.project.dependencies.clone(),
                self.included_scopes.clone(),
            )));
        }

        sources.push(Box::new(MainArtifactSource::new(
            ctx.project.artifact.clone(),
            self.fail_on_missing_main_artifact,
        )));

        Ok(sources)
    }

    fn dispose(&self, output: &Path, outputs: &mut dyn BuildOutputs) {
        if self.attach {
            outputs.attach_artifact(DP_CLASSIFIER, output);
        }
    }
}

/// Package the project with all its dependencies as the build's deliverable.
#[derive(Debug, Clone, Default)]
pub struct PackageMode;

impl ModePolicy for PackageMode {
    fn name(&self) -> &'static str {
        "package"
    }

    fn sources<'a>(
        &self,
        ctx: &BuildContext<'a>,
        config: &DpConfig,
    ) -> DpResult<Vec<Box<dyn ArtifactSource + 'a>>> {
        let mut sources = common_sources(ctx, config)?;
        sources.push(Box::new(DependencyArtifactsSource::all(
            ctx.project.dependencies.clone(),
        )));
        Ok(sources)
    }

    fn dispose(&self, output: &Path, outputs: &mut dyn BuildOutputs) {
        outputs.set_primary_artifact(output);
    }
}

/// The available packaging modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Build,
    Bundle,
    Package,
}

impl Mode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Bundle => "bundle",
            Self::Package => "package",
        }
    }

    /// Create the policy for this mode from the configuration.
    #[must_use]
    pub fn policy(&self, config: &DpConfig) -> Box<dyn ModePolicy> {
        match self {
            Self::Build => Box::new(BuildMode {
                attach: config.attach,
            }),
            Self::Bundle => Box::new(BundleMode {
                attach: config.attach,
                fail_on_missing_main_artifact: config.fail_on_missing_main_artifact,
                ignore_project_dependencies: config.ignore_project_dependencies,
                included_scopes: config.included_scopes.clone(),
            }),
            Self::Package => Box::new(PackageMode),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(Self::Build),
            "bundle" => Ok(Self::Bundle),
            "package" => Ok(Self::Package),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// Run one packaging mode.
///
/// Returns `Ok(None)` without touching anything when the configuration says
/// to skip.
pub fn run(
    policy: &dyn ModePolicy,
    config: &DpConfig,
    ctx: &BuildContext<'_>,
    outputs: &mut dyn BuildOutputs,
) -> DpResult<Option<AssemblyResult>> {
    if config.skip {
        tracing::info!("Skipping deployment package ({})", policy.name());
        return Ok(None);
    }

    let sources = policy.sources(ctx, config)?;
    let sources: Vec<&dyn ArtifactSource> = sources.iter().map(|s| s.as_ref()).collect();

    let result = PackageAssembler::new(config, ctx.session).assemble(ctx.project, &sources)?;
    policy.dispose(&result.output, outputs);

    Ok(Some(result))
}

#[cfg(test)]
#[path = "mode/mode_tests.rs"]
mod mode_tests;
