#![allow(non_snake_case)]

use super::*;
use crate::error::ResolutionError;
use crate::project::{DependencyArtifact, DependencyNode, PluginDescriptor, RecordedOutputs};
use crate::resolver::{Coordinate, LocalRepositoryResolver};
use crate::test_support::write_bundle;
use crate::DpError;
use chrono::{TimeZone, Utc};
use std::path::PathBuf;
use tempfile::TempDir;
use test_case::test_case;

struct NoResolver;

impl DependencyResolver for NoResolver {
    fn resolve(&self, coordinates: &[Coordinate]) -> Result<Vec<PathBuf>, ResolutionError> {
        Err(ResolutionError::new(coordinates[0].to_string(), "no repository"))
    }
}

struct Fixture {
    temp_dir: TempDir,
    project: ProjectModel,
    session: BuildSession,
    trees: TreeProviders,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let project = ProjectModel {
            artifact_id: "myproj".to_string(),
            packaging: "jar".to_string(),
            version: "1.0.0".to_string(),
            build_directory: temp_dir.path().join("target"),
            artifact: None,
            dependencies: Vec::new(),
            expanded_version: None,
        };
        Self {
            temp_dir,
            project,
            session: BuildSession::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
            trees: TreeProviders::new(),
        }
    }

    fn bundle(&self, file_name: &str, symbolic_name: &str) -> PathBuf {
        write_bundle(self.temp_dir.path(), file_name, symbolic_name, "1.0.0")
    }

    fn dependency(&mut self, file_name: &str, symbolic_name: &str, scope: &str) {
        let file = self.bundle(file_name, symbolic_name);
        self.project.dependencies.push(DependencyArtifact {
            id: symbolic_name.to_string(),
            scope: scope.to_string(),
            file: Some(file),
        });
    }

    fn run(
        &self,
        mode: Mode,
        config: &DpConfig,
        resolver: &dyn DependencyResolver,
    ) -> (DpResult<Option<AssemblyResult>>, RecordedOutputs) {
        let ctx = BuildContext {
            project: &self.project,
            session: &self.session,
            resolver,
            trees: &self.trees,
        };
        let mut outputs = RecordedOutputs::default();
        let result = run(mode.policy(config).as_ref(), config, &ctx, &mut outputs);
        (result, outputs)
    }
}

fn entry_names(result: &AssemblyResult) -> Vec<&str> {
    result.files.iter().map(|(name, _)| name.as_str()).collect()
}

// Mode

#[test_case("build", Mode::Build)]
#[test_case("bundle", Mode::Bundle)]
#[test_case("package", Mode::Package)]
fn Mode___from_str___round_trips_name(name: &str, expected: Mode) {
    let mode: Mode = name.parse().unwrap();

    assert_eq!(mode, expected);
    assert_eq!(mode.to_string(), name);
    assert_eq!(mode.policy(&DpConfig::default()).name(), name);
}

#[test]
fn Mode___from_str___unknown___returns_error() {
    let result = "deploy".parse::<Mode>();

    assert!(result.unwrap_err().contains("deploy"));
}

// Skip

#[test_case(Mode::Build)]
#[test_case(Mode::Bundle)]
#[test_case(Mode::Package)]
fn run___skip___does_nothing(mode: Mode) {
    let fixture = Fixture::new();
    let config = DpConfig {
        skip: true,
        ..DpConfig::default()
    };

    let (result, outputs) = fixture.run(mode, &config, &NoResolver);

    assert!(result.unwrap().is_none());
    assert_eq!(outputs, RecordedOutputs::default());
    assert!(!fixture.project.build_directory.exists());
}

// Build

#[test]
fn run___build___packages_project_artifact_and_attaches() {
    let mut fixture = Fixture::new();
    fixture.project.artifact = Some(fixture.bundle("myproj.jar", "com.example.app"));
    fixture.dependency("dep.jar", "com.example.dep", "compile");

    let (result, outputs) = fixture.run(Mode::Build, &DpConfig::default(), &NoResolver);

    let result = result.unwrap().unwrap();
    assert_eq!(entry_names(&result), vec!["com.example.app_1.0.0.jar"]);
    assert_eq!(outputs.attached, vec![("dp".to_string(), result.output.clone())]);
    assert_eq!(outputs.primary, None);
}

#[test]
fn run___build___no_attach___writes_without_attaching() {
    let fixture = Fixture::new();
    let config = DpConfig {
        attach: false,
        ..DpConfig::default()
    };

    let (result, outputs) = fixture.run(Mode::Build, &config, &NoResolver);

    assert!(result.unwrap().unwrap().output.is_file());
    assert!(outputs.attached.is_empty());
}

#[test]
fn run___build___feature_packaging___uses_dependency_tree() {
    let mut fixture = Fixture::new();
    fixture.project.packaging = "eclipse-feature".to_string();
    let plugin = fixture.bundle("plugin.jar", "com.example.plugin");
    fixture.trees.register(
        "eclipse-feature",
        DependencyNode::Feature {
            id: "myproj".to_string(),
            children: vec![DependencyNode::Plugin(PluginDescriptor {
                id: "com.example.plugin".to_string(),
                artifact_type: "eclipse-plugin".to_string(),
                project_artifact: None,
                location: Some(plugin),
            })],
        },
    );

    let (result, _) = fixture.run(Mode::Build, &DpConfig::default(), &NoResolver);

    assert_eq!(
        entry_names(&result.unwrap().unwrap()),
        vec!["com.example.plugin_1.0.0.jar"]
    );
}

#[test]
fn run___build___additional_dependencies_come_from_repository() {
    let mut fixture = Fixture::new();
    fixture.project.artifact = Some(fixture.bundle("myproj.jar", "com.example.app"));
    let repository = fixture.temp_dir.path().join("repository");
    let coordinate = Coordinate::new("org.example", "extra", "2.0");
    let resolver = LocalRepositoryResolver::new(&repository);
    let target = resolver.path_of(&coordinate);
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    write_bundle(
        target.parent().unwrap(),
        target.file_name().unwrap().to_str().unwrap(),
        "org.example.extra",
        "2.0.0",
    );
    let config = DpConfig {
        additional_dependencies: vec![coordinate],
        ..DpConfig::default()
    };

    let (result, _) = fixture.run(Mode::Build, &config, &resolver);

    assert_eq!(
        entry_names(&result.unwrap().unwrap()),
        vec!["com.example.app_1.0.0.jar", "org.example.extra_2.0.0.jar"]
    );
}

#[test]
fn run___build___unresolvable_additional_dependency___fails_without_output() {
    let fixture = Fixture::new();
    let config = DpConfig {
        additional_dependencies: vec![Coordinate::new("org.example", "missing", "1.0")],
        ..DpConfig::default()
    };

    let (result, outputs) = fixture.run(Mode::Build, &config, &NoResolver);

    assert!(matches!(result, Err(DpError::Resolution(_))));
    assert!(outputs.attached.is_empty());
    assert!(!fixture.project.build_directory.join("myproj_1.0.0.dp").exists());
}

// Bundle

#[test]
fn run___bundle___includes_scoped_dependencies_and_main_artifact() {
    let mut fixture = Fixture::new();
    fixture.project.artifact = Some(fixture.bundle("myproj.jar", "com.example.app"));
    fixture.dependency("c.jar", "com.example.compile", "compile");
    fixture.dependency("t.jar", "com.example.test", "test");
    fixture.dependency("r.jar", "com.example.runtime", "runtime");

    let (result, outputs) = fixture.run(Mode::Bundle, &DpConfig::default(), &NoResolver);

    let result = result.unwrap().unwrap();
    assert_eq!(
        entry_names(&result),
        vec![
            "com.example.app_1.0.0.jar",
            "com.example.compile_1.0.0.jar",
            "com.example.runtime_1.0.0.jar",
        ]
    );
    assert_eq!(outputs.attached.len(), 1);
}

#[test]
fn run___bundle___ignore_project_dependencies___skips_them() {
    let mut fixture = Fixture::new();
    fixture.project.artifact = Some(fixture.bundle("myproj.jar", "com.example.app"));
    fixture.dependency("c.jar", "com.example.compile", "compile");
    let config = DpConfig {
        ignore_project_dependencies: true,
        ..DpConfig::default()
    };

    let (result, _) = fixture.run(Mode::Bundle, &config, &NoResolver);

    assert_eq!(
        entry_names(&result.unwrap().unwrap()),
        vec!["com.example.app_1.0.0.jar"]
    );
}

#[test]
fn run___bundle___missing_main_artifact___fails() {
    let fixture = Fixture::new();

    let (result, outputs) = fixture.run(Mode::Bundle, &DpConfig::default(), &NoResolver);

    let err = result.unwrap_err();
    assert!(matches!(err, DpError::MissingMainArtifact));
    assert!(err.to_string().contains("failOnMissingMainArtifact"));
    assert!(outputs.attached.is_empty());
}

#[test]
fn run___bundle___missing_main_artifact_allowed___writes_package() {
    let mut fixture = Fixture::new();
    fixture.dependency("c.jar", "com.example.compile", "compile");
    let config = DpConfig {
        fail_on_missing_main_artifact: false,
        ..DpConfig::default()
    };

    let (result, _) = fixture.run(Mode::Bundle, &config, &NoResolver);

    assert_eq!(
        entry_names(&result.unwrap().unwrap()),
        vec!["com.example.compile_1.0.0.jar"]
    );
}

// Package

#[test]
fn run___package___includes_all_dependencies_and_sets_primary() {
    let mut fixture = Fixture::new();
    fixture.project.artifact = Some(fixture.bundle("myproj.jar", "com.example.app"));
    fixture.dependency("c.jar", "com.example.compile", "compile");
    fixture.dependency("t.jar", "com.example.test", "test");

    let (result, outputs) = fixture.run(Mode::Package, &DpConfig::default(), &NoResolver);

    let result = result.unwrap().unwrap();
    assert_eq!(
        entry_names(&result),
        vec![
            "com.example.app_1.0.0.jar",
            "com.example.compile_1.0.0.jar",
            "com.example.test_1.0.0.jar",
        ]
    );
    assert_eq!(outputs.primary, Some(result.output.clone()));
    assert!(outputs.attached.is_empty());
}

#[test]
fn run___package___dependency_overrides_project_artifact_of_same_identity() {
    let mut fixture = Fixture::new();
    fixture.project.artifact = Some(fixture.bundle("myproj.jar", "com.example.app"));
    fixture.dependency("other.jar", "com.example.app", "compile");

    let (result, _) = fixture.run(Mode::Package, &DpConfig::default(), &NoResolver);

    let result = result.unwrap().unwrap();
    assert_eq!(
        result.files,
        vec![(
            "com.example.app_1.0.0.jar".to_string(),
            fixture.temp_dir.path().join("other.jar")
        )]
    );
}
