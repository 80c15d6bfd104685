//! Live git adapter using `git` CLI commands.

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::ports::git::GitRepo;
use crate::ports::PortError;
use crate::repo::RepoSpec;

/// Live git adapter that shells out to the `git` CLI.
pub struct LiveGitRepo;

impl GitRepo for LiveGitRepo {
    fn fetch(&self, spec: &RepoSpec, dest: &Path) -> Result<(), PortError> {
        if dest.exists() {
            info!(path = %dest.display(), "repository already exists, using existing clone");
            return Ok(());
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut cmd = Command::new("git");
        cmd.args(["clone", "--depth", "1"]);
        if let Some(tag) = &spec.tag {
            cmd.arg("--branch").arg(tag);
        }
        cmd.arg(spec.clone_url()).arg(dest);

        info!(url = %spec.clone_url(), path = %dest.display(), "cloning repository");
        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                let _ = std::fs::remove_dir_all(dest);
                return Err(format!("failed to run git: {e}").into());
            }
        };
        if !output.status.success() {
            let _ = std::fs::remove_dir_all(dest);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git clone failed: {}", stderr.trim()).into());
        }
        Ok(())
    }

    fn current_commit(&self, path: &Path) -> Result<String, PortError> {
        let output = Command::new("git").arg("-C").arg(path).args(["rev-parse", "HEAD"]).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git rev-parse HEAD failed: {}", stderr.trim()).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
