//! Package listing

use anyhow::{Context, Result};
use osgi_dp::PackageReader;
use serde::Serialize;
use std::path::Path;

/// One bundle of a listed package.
#[derive(Debug, Serialize)]
pub struct ListedEntry {
    pub name: String,
    pub symbolic_name: String,
    pub version: Option<String>,
}

/// Contents of a deployment package.
#[derive(Debug, Serialize)]
pub struct Listing {
    pub symbolic_name: String,
    pub version: String,
    pub entries: Vec<ListedEntry>,
}

/// Read the listing of a package file.
pub fn read_listing(path: &Path) -> Result<Listing> {
    let reader = PackageReader::open(path)
        .with_context(|| format!("Failed to open deployment package: {:?}", path))?;
    let manifest = reader.manifest();

    Ok(Listing {
        symbolic_name: manifest.symbolic_name().to_string(),
        version: manifest.version().to_string(),
        entries: manifest
            .entries()
            .iter()
            .map(|(name, identity)| ListedEntry {
                name: name.clone(),
                symbolic_name: identity.symbolic_name().to_string(),
                version: identity.version().map(str::to_string),
            })
            .collect(),
    })
}

/// List command implementation
pub fn run(path: &Path, json: bool) -> Result<()> {
    let listing = read_listing(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Deployment package: {} {}", listing.symbolic_name, listing.version);
    println!("Bundles: {}", listing.entries.len());
    for entry in &listing.entries {
        println!(
            "  {} ({} {})",
            entry.name,
            entry.symbolic_name,
            entry.version.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
