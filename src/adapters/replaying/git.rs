//! Replaying adapter for the `GitRepo` port.

use std::path::Path;
use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::git::GitRepo;
use crate::ports::PortError;
use crate::repo::RepoSpec;

/// Replays recorded clone and commit lookups without touching the network.
///
/// `fetch` does not create `dest`; replayed runs expect the working copy to
/// be present already.
pub struct ReplayingGitRepo {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingGitRepo {
    /// Creates a replaying git repo from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl GitRepo for ReplayingGitRepo {
    fn fetch(&self, _spec: &RepoSpec, _dest: &Path) -> Result<(), PortError> {
        replay_result(next_output(&self.replayer, "git", "fetch"), "git::fetch")
    }

    fn current_commit(&self, _path: &Path) -> Result<String, PortError> {
        replay_result(next_output(&self.replayer, "git", "current_commit"), "git::current_commit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn make_replayer(interactions: Vec<Interaction>) -> CassetteReplayer {
        let cassette = Cassette { name: "test".into(), recorded_at: Utc::now(), commit: "abc".into(), interactions };
        CassetteReplayer::new(&cassette)
    }

    fn git_call(seq: u64, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: "git".into(), method: method.into(), input: json!({}), output }
    }

    #[test]
    fn replays_fetch_and_commit() {
        let git = ReplayingGitRepo::new(make_replayer(vec![
            git_call(0, "fetch", json!({"ok": null})),
            git_call(1, "current_commit", json!({"ok": "abc123def"})),
        ]));
        let spec: RepoSpec = "octo/widget".parse().unwrap();

        git.fetch(&spec, Path::new("/cache/src")).unwrap();
        assert_eq!(git.current_commit(Path::new("/cache/src")).unwrap(), "abc123def");
    }

    #[test]
    fn replays_clone_failure() {
        let git = ReplayingGitRepo::new(make_replayer(vec![git_call(
            0,
            "fetch",
            json!({"err": "git clone failed: repository not found"}),
        )]));
        let spec: RepoSpec = "octo/missing".parse().unwrap();

        let err = git.fetch(&spec, Path::new("/cache/src")).unwrap_err();
        assert!(err.to_string().contains("repository not found"));
    }
}
