//! osgi-dp CLI - OSGi deployment package builder
//!
//! Commands:
//! - `osgi-dp build` - Package the project's contents and attach the package
//! - `osgi-dp bundle` - Package the project with its scoped dependencies
//! - `osgi-dp package` - Package the project with all dependencies as the primary output
//! - `osgi-dp list` - Show the contents of a deployment package

use clap::{Parser, Subcommand};
use osgi_dp::Mode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod descriptor;
mod list;
mod run;

use run::RunArgs;

#[derive(Parser)]
#[command(name = "osgi-dp")]
#[command(author, version, about = "Build OSGi deployment packages", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package the project's own contents and attach the package
    Build(RunArgs),

    /// Package the project together with its dependencies and main artifact
    Bundle(RunArgs),

    /// Package the project with all dependencies as the primary output
    Package(RunArgs),

    /// Show the contents of a deployment package
    List {
        /// Path to the .dp file
        package: PathBuf,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build(args) => run::run(Mode::Build, &args)?,
        Commands::Bundle(args) => run::run(Mode::Bundle, &args)?,
        Commands::Package(args) => run::run(Mode::Package, &args)?,
        Commands::List { package, json } => list::run(&package, json)?,
    }

    Ok(())
}
