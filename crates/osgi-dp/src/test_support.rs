//! Fixture archives shared by the unit tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Write a jar with the given manifest text (or none) and one class entry.
pub fn write_jar(dir: &Path, file_name: &str, manifest: Option<&str>) -> PathBuf {
    let path = dir.join(file_name);
    let file = File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    if let Some(manifest) = manifest {
        zip.start_file("META-INF/MANIFEST.MF", options).unwrap();
        zip.write_all(manifest.as_bytes()).unwrap();
    }
    zip.start_file("com/example/Main.class", options).unwrap();
    zip.write_all(b"\xca\xfe\xba\xbe").unwrap();
    zip.finish().unwrap();

    path
}

/// Write a bundle jar with the given symbolic name and version headers.
pub fn write_bundle(dir: &Path, file_name: &str, symbolic_name: &str, version: &str) -> PathBuf {
    let manifest = format!(
        "Manifest-Version: 1.0\r\nBundle-ManifestVersion: 2\r\nBundle-SymbolicName: {symbolic_name}\r\nBundle-Version: {version}\r\n\r\n"
    );
    write_jar(dir, file_name, Some(&manifest))
}
