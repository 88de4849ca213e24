//! Blocking `git` subprocess fallbacks.
//!
//! Every fallback named by the lookup contract is a single `git` command
//! run in a fixed repository directory with captured output. There is no
//! retry and no shelling through an intermediate interpreter; stderr is
//! preserved in the error when a command fails.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Runs `git` commands in a fixed repository directory.
#[derive(Debug, Clone)]
pub struct GitClient {
    repo_dir: PathBuf,
}

impl Default for GitClient {
    /// A client for the current working directory.
    fn default() -> Self {
        Self::new(".")
    }
}

impl GitClient {
    /// Creates a client that runs `git -C <repo_dir> …`.
    #[must_use]
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    /// The directory this client targets.
    #[must_use]
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Builds the command without running it. Split out so the argv can
    /// be inspected in tests.
    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.repo_dir).args(args);
        cmd
    }

    /// Runs `git` with `args`, returning trimmed stdout.
    pub fn run(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(args = ?args, repo_dir = %self.repo_dir.display(), "running git fallback");
        let output = self.command(args).output().map_err(|source| GitError::Spawn {
            args: args.join(" "),
            source,
        })?;

        if !output.status.success() {
            return Err(GitError::Command {
                args: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| GitError::NonUtf8Output {
            args: args.join(" "),
        })?;
        Ok(stdout.trim().to_string())
    }

    /// Full hash of the checked-out commit.
    pub fn head_sha(&self) -> Result<String, GitError> {
        self.run(&["show", "-s", "--format=%H"])
    }

    /// Full message of the checked-out commit.
    pub fn head_message(&self) -> Result<String, GitError> {
        self.run(&["log", "-1", "--format=%B"])
    }

    /// Committer datetime of the checked-out commit, strict ISO-8601.
    pub fn head_datetime(&self) -> Result<String, GitError> {
        self.run(&["log", "-1", "--format=%cI"])
    }

    /// Name of the checked-out branch (`HEAD` when detached).
    pub fn head_branch(&self) -> Result<String, GitError> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// URL configured for the `origin` remote.
    ///
    /// `ls-remote --get-url` resolves the URL without touching the
    /// network. When no URL is configured git echoes the remote name
    /// back; callers treat an output of `origin` as no remote.
    pub fn remote_url(&self) -> Result<String, GitError> {
        self.run(&["ls-remote", "--get-url", "origin"])
    }
}

#[cfg(test)]
mod tests {
    use super::GitClient;

    #[test]
    fn command_pins_the_repo_directory() {
        let client = GitClient::new("/work/checkout");
        let cmd = client.command(&["rev-parse", "--abbrev-ref", "HEAD"]);
        assert_eq!(cmd.get_program(), "git");

        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(
            args,
            vec!["-C", "/work/checkout", "rev-parse", "--abbrev-ref", "HEAD"]
        );
    }

    #[test]
    fn run_surfaces_stderr_on_failure() {
        let client = GitClient::new("/nonexistent/cifacts-test-dir");
        let err = client.head_sha().expect_err("must fail outside a repository");
        let rendered = err.to_string();
        assert!(rendered.contains("show -s --format=%H"), "got: {rendered}");
    }
}
