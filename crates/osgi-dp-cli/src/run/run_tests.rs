#![allow(non_snake_case)]

use super::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_bundle(dir: &Path, file_name: &str, symbolic_name: &str, version: &str) -> PathBuf {
    let path = dir.join(file_name);
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    zip.start_file("META-INF/MANIFEST.MF", zip::write::SimpleFileOptions::default())
        .unwrap();
    write!(
        zip,
        "Manifest-Version: 1.0\r\nBundle-SymbolicName: {symbolic_name}\r\nBundle-Version: {version}\r\n\r\n"
    )
    .unwrap();
    zip.finish().unwrap();
    path
}

/// Write a descriptor for a project whose artifact is a bundle.
fn create_project(temp_dir: &TempDir, version: &str) -> PathBuf {
    write_bundle(temp_dir.path(), "myproj.jar", "com.example.app", "1.0.0");
    let path = temp_dir.path().join("project.toml");
    fs::write(
        &path,
        format!(
            r#"
[project]
artifact_id = "myproj"
version = "{version}"
artifact = "myproj.jar"
"#
        ),
    )
    .unwrap();
    path
}

fn args(project: PathBuf) -> RunArgs {
    RunArgs {
        project,
        session_time: Some("2023-11-14T22:13:20Z".to_string()),
        ..RunArgs::default()
    }
}

// Configuration

#[test]
fn load_config___no_file___uses_defaults() {
    let config = load_config(&RunArgs::default()).unwrap();

    assert_eq!(config, DpConfig::default());
}

#[test]
fn load_config___flags___override_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dp.toml");
    fs::write(&config_path, "attach = true\nskip = false\nversion = \"1.0\"\n").unwrap();
    let args = RunArgs {
        config: Some(config_path),
        skip: true,
        no_attach: true,
        qualified_filename: true,
        dp_version: Some("2.5".to_string()),
        ..RunArgs::default()
    };

    let config = load_config(&args).unwrap();

    assert!(config.skip);
    assert!(!config.attach);
    assert!(config.use_qualified_filename);
    assert_eq!(config.version.as_deref(), Some("2.5.0"));
}

#[test]
fn load_config___invalid_version___returns_error() {
    let args = RunArgs {
        dp_version: Some("1.x".to_string()),
        ..RunArgs::default()
    };

    assert!(load_config(&args).is_err());
}

#[test]
fn load_session___rfc3339___uses_given_time() {
    let args = args(PathBuf::from("project.toml"));

    let session = load_session(&args).unwrap();

    assert_eq!(session.epoch_seconds(), 1_700_000_000);
}

#[test]
fn load_session___invalid_time___returns_error() {
    let args = RunArgs {
        session_time: Some("yesterday".to_string()),
        ..RunArgs::default()
    };

    let err = load_session(&args).unwrap_err();

    assert!(err.to_string().contains("Invalid session time"));
}

#[test]
fn repository___explicit___is_used() {
    let args = RunArgs {
        repository: Some(PathBuf::from("/repo")),
        ..RunArgs::default()
    };

    assert_eq!(repository(&args), PathBuf::from("/repo"));
}

// Execution

#[test]
fn execute___package___reports_primary_output() {
    let temp_dir = TempDir::new().unwrap();
    let project = create_project(&temp_dir, "1.0.0-SNAPSHOT");

    let report = execute(Mode::Package, &args(project)).unwrap();

    let output = temp_dir.path().join("target").join("myproj_1.0.0-SNAPSHOT.dp");
    assert_eq!(report.mode, "package");
    assert_eq!(report.output, Some(output.clone()));
    assert_eq!(report.version.as_deref(), Some("1.0.0.1700000000"));
    assert_eq!(report.entries, vec!["com.example.app_1.0.0.jar"]);
    assert_eq!(report.outputs.primary, Some(output.clone()));
    assert!(output.is_file());
}

#[test]
fn execute___build___attaches_output() {
    let temp_dir = TempDir::new().unwrap();
    let project = create_project(&temp_dir, "1.0.0");

    let report = execute(Mode::Build, &args(project)).unwrap();

    assert_eq!(report.outputs.attached.len(), 1);
    assert_eq!(report.outputs.attached[0].0, "dp");
    assert_eq!(report.outputs.primary, None);
}

#[test]
fn execute___skip___reports_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let project = create_project(&temp_dir, "1.0.0");
    let args = RunArgs {
        skip: true,
        ..args(project)
    };

    let report = execute(Mode::Bundle, &args).unwrap();

    assert!(report.output.is_none());
    assert!(report.entries.is_empty());
    assert!(!temp_dir.path().join("target").exists());
}

#[test]
fn execute___skip___does_not_read_descriptor() {
    let args = RunArgs {
        project: PathBuf::from("/nonexistent/project.toml"),
        skip: true,
        ..RunArgs::default()
    };

    let report = execute(Mode::Package, &args).unwrap();

    assert_eq!(report.mode, "package");
    assert!(report.output.is_none());
    assert_eq!(report.outputs, RecordedOutputs::default());
}

#[test]
fn execute___skip_in_config_file___does_not_read_descriptor() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dp.toml");
    fs::write(&config_path, "skip = true\n").unwrap();
    let project = temp_dir.path().join("project.toml");
    fs::write(&project, "not a descriptor").unwrap();
    let args = RunArgs {
        project,
        config: Some(config_path),
        ..RunArgs::default()
    };

    let report = execute(Mode::Build, &args).unwrap();

    assert!(report.output.is_none());
}

#[test]
fn execute___bundle_without_artifact___returns_error_with_context() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("project.toml");
    fs::write(&project, "[project]\nartifact_id = \"p\"\nversion = \"1.0.0\"\n").unwrap();

    let err = execute(Mode::Bundle, &args(project)).unwrap_err();

    assert!(err.to_string().contains("Failed to bundle deployment package"));
    assert!(format!("{err:#}").contains("failOnMissingMainArtifact"));
}

#[test]
fn RunReport___serializes_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let project = create_project(&temp_dir, "1.0.0");

    let report = execute(Mode::Package, &args(project)).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["mode"], "package");
    assert_eq!(json["entries"][0], "com.example.app_1.0.0.jar");
    assert!(json["outputs"]["primary"].is_string());
}
