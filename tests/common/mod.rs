// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A scratch directory holding the mapping, speed table and output of one run
///
/// The binary runs with this directory as its working directory, HOME and
/// XDG_CONFIG_HOME, so no config file from the host leaks into a test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        self.write_bytes(name, content.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    pub fn write_gzip(&self, name: &str, content: &str) -> PathBuf {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(content.as_bytes())
            .expect("Failed to gzip fixture");
        let compressed = encoder.finish().expect("Failed to finish gzip");
        self.write_bytes(name, &compressed)
    }

    pub fn write_zstd(&self, name: &str, content: &str) -> PathBuf {
        let compressed =
            zstd::encode_all(content.as_bytes(), 0).expect("Failed to zstd fixture");
        self.write_bytes(name, &compressed)
    }

    /// Run edgespeed inside the workspace, returning (stdout, stderr, exit code)
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_edgespeed"))
            .args(args)
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to start edgespeed");

        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code().unwrap_or(-1),
        )
    }

    /// Output records as a set; arrival order across workers is unspecified
    pub fn records(&self, name: &str) -> BTreeSet<String> {
        read_records(&self.path(name))
    }
}

pub fn read_records(path: &Path) -> BTreeSet<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn record_set(records: &[&str]) -> BTreeSet<String> {
    records.iter().map(|s| s.to_string()).collect()
}
