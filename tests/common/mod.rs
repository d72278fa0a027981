//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Scratch layout for one run: an input CSV plus an output directory.
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    pub fn create() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir(root.path().join("out")).expect("create output dir");
        Self { root }
    }

    pub fn input(&self) -> PathBuf {
        self.root.path().join("input.csv")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    pub fn write_input(&self, content: &str) -> &Self {
        std::fs::write(self.input(), content).expect("write input csv");
        self
    }

    pub fn read_output(&self, name: &str) -> String {
        std::fs::read_to_string(self.output_dir().join(name))
            .unwrap_or_else(|err| panic!("read {name}: {err}"))
    }

    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.output_dir())
            .expect("read output dir")
            .map(|entry| {
                entry
                    .expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    /// Run the binary isolated from any user-level credentials.
    pub fn run(&self, args: &[&str]) -> Output {
        command(self.root.path())
            .arg("-i")
            .arg(self.input())
            .arg("-o")
            .arg(self.output_dir())
            .args(args)
            .output()
            .expect("run csv2metadata")
    }
}

pub fn command(config_home: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_csv2metadata"));
    command
        .env_remove("CSV2METADATA_CREDENTIALS")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", config_home.join("config"))
        .env("HOME", config_home);
    command
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
