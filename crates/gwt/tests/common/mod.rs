use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Result, ensure};
use tempfile::TempDir;

/// Return the path to the compiled `gwt` binary for integration-style tests.
pub fn gwt_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gwt"))
}

/// Run a git command inside `repo_path`, ensuring it succeeds.
pub fn git(repo_path: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;

    ensure!(
        output.status.success(),
        "git command failed: git {}\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    Ok(output)
}

/// Initialise a new repository at `repo_path` with a README commit on `main`.
pub fn init_repository(repo_path: &Path) -> Result<()> {
    if !repo_path.exists() {
        fs::create_dir_all(repo_path)?;
    }

    git(repo_path, &["init", "-b", "main"])?;
    git(repo_path, &["config", "user.email", "test@example.com"])?;
    git(repo_path, &["config", "user.name", "Test User"])?;

    fs::write(repo_path.join("README.md"), "# Test Project")?;
    git(repo_path, &["add", "README.md"])?;
    git(repo_path, &["commit", "-m", "Initial commit"])?;

    Ok(())
}

/// Temporary sandbox holding a repository and an isolated config file.
pub struct Fixture {
    /// Keeps the temporary directory alive.
    _temp_dir: TempDir,
    /// Canonical path of the repository's main worktree.
    pub repo: PathBuf,
    /// Canonical path of the directory containing the repository.
    pub root: PathBuf,
    /// Config file passed to every invocation.
    pub config: PathBuf,
}

impl Fixture {
    /// Create a repository named `repo` inside a fresh temporary directory.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        let repo = root.join("repo");
        init_repository(&repo)?;
        Ok(Self {
            config: root.join("gwt.toml"),
            _temp_dir: temp_dir,
            repo,
            root,
        })
    }

    /// Prepare a `Command` running `gwt` from `cwd` with the fixture config.
    pub fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(gwt_binary());
        cmd.current_dir(cwd);
        cmd.arg("--config");
        cmd.arg(&self.config);
        cmd.arg("--no-color");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Run `gwt` from the repository root with `args`.
    pub fn run(&self, args: &[&str]) -> Result<Output> {
        self.run_in(&self.repo, args)
    }

    /// Run `gwt` from `cwd` with `args`.
    pub fn run_in(&self, cwd: &Path, args: &[&str]) -> Result<Output> {
        self.command(cwd)
            .args(args)
            .output()
            .with_context(|| format!("failed to run gwt {}", args.join(" ")))
    }
}

/// Captured stdout as text.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Panic with both streams when `output` is not a success.
pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "gwt failed ({:?})\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}
