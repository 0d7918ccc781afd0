//! Packaging commands (`build`, `bundle`, `package`)

use crate::descriptor::Descriptor;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use osgi_dp::{
    AssemblyResult, BuildContext, BuildSession, DpConfig, LocalRepositoryResolver, Mode,
    RecordedOutputs,
};
use serde::Serialize;
use std::path::PathBuf;

/// Options shared by the packaging commands.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Path to the project descriptor
    #[arg(short, long)]
    pub project: PathBuf,

    /// Path to a deployment package configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Local repository for additional dependencies (default: ~/.m2/repository)
    #[arg(short, long)]
    pub repository: Option<PathBuf>,

    /// Build session start time, RFC 3339 (default: now)
    #[arg(long)]
    pub session_time: Option<String>,

    /// Skip generating the package
    #[arg(long)]
    pub skip: bool,

    /// Explicit package version
    #[arg(long = "version")]
    pub dp_version: Option<String>,

    /// Use the qualified version in the file name
    #[arg(long)]
    pub qualified_filename: bool,

    /// Do not attach the package to the build
    #[arg(long)]
    pub no_attach: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// What a run produced, as printed with `--json`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub mode: String,
    pub output: Option<PathBuf>,
    pub version: Option<String>,
    pub entries: Vec<String>,
    pub outputs: RecordedOutputs,
}

impl RunReport {
    fn new(mode: Mode, result: Option<&AssemblyResult>, outputs: RecordedOutputs) -> Self {
        Self {
            mode: mode.to_string(),
            output: result.map(|r| r.output.clone()),
            version: result.map(|r| r.manifest.version().to_string()),
            entries: result
                .map(|r| r.files.iter().map(|(name, _)| name.clone()).collect())
                .unwrap_or_default(),
            outputs,
        }
    }
}

/// Run a packaging command
pub fn run(mode: Mode, args: &RunArgs) -> Result<()> {
    let report = execute(mode, args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let Some(output) = &report.output else {
        println!("Skipped deployment package");
        return Ok(());
    };

    println!(
        "Built deployment package: {} ({} bundles)",
        output.display(),
        report.entries.len()
    );
    for entry in &report.entries {
        println!("  {}", entry);
    }
    if let Some(primary) = &report.outputs.primary {
        println!("Primary artifact: {}", primary.display());
    }
    for (classifier, path) in &report.outputs.attached {
        println!("Attached ({}): {}", classifier, path.display());
    }

    Ok(())
}

/// Assemble the package without printing anything.
pub fn execute(mode: Mode, args: &RunArgs) -> Result<RunReport> {
    let config = load_config(args)?;
    if config.skip {
        tracing::info!("Skipping deployment package ({})", mode);
        return Ok(RunReport::new(mode, None, RecordedOutputs::default()));
    }

    let descriptor = Descriptor::from_file(&args.project)?;
    tracing::debug!("Loaded project descriptor: {}", args.project.display());
    let session = load_session(args)?;
    tracing::debug!("Build session started at {}", session.start_time());
    let resolver = LocalRepositoryResolver::new(repository(args));
    let trees = descriptor.tree_providers();

    let ctx = BuildContext {
        project: &descriptor.project,
        session: &session,
        resolver: &resolver,
        trees: &trees,
    };

    let mut outputs = RecordedOutputs::default();
    let result = osgi_dp::run(mode.policy(&config).as_ref(), &config, &ctx, &mut outputs)
        .with_context(|| format!("Failed to {} deployment package", mode))?;

    Ok(RunReport::new(mode, result.as_ref(), outputs))
}

/// Read the configuration file, if any, and apply command-line overrides.
pub fn load_config(args: &RunArgs) -> Result<DpConfig> {
    let mut config = match &args.config {
        Some(path) => DpConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration: {:?}", path))?,
        None => DpConfig::new(),
    };

    if args.skip {
        config.skip = true;
    }
    if args.qualified_filename {
        config.use_qualified_filename = true;
    }
    if args.no_attach {
        config.attach = false;
    }
    if let Some(version) = &args.dp_version {
        config = config.with_version(version)?;
    }

    tracing::debug!("Configuration: {:?}", config);

    Ok(config)
}

fn load_session(args: &RunArgs) -> Result<BuildSession> {
    match &args.session_time {
        Some(time) => {
            let start = DateTime::parse_from_rfc3339(time)
                .with_context(|| format!("Invalid session time: {}", time))?;
            Ok(BuildSession::new(start.with_timezone(&Utc)))
        }
        None => Ok(BuildSession::now()),
    }
}

fn repository(args: &RunArgs) -> PathBuf {
    if let Some(repository) = &args.repository {
        return repository.clone();
    }

    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".m2")
        .join("repository")
}

#[cfg(test)]
#[path = "run/run_tests.rs"]
mod run_tests;
