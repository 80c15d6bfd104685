//! Recording adapter for the `GitRepo` port.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::git::GitRepo;
use crate::ports::PortError;
use crate::repo::RepoSpec;

/// Records git interactions while delegating to an inner implementation.
///
/// The recorded commit is also stamped into the cassette header.
pub struct RecordingGitRepo {
    inner: Box<dyn GitRepo>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGitRepo {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn GitRepo>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl GitRepo for RecordingGitRepo {
    fn fetch(&self, spec: &RepoSpec, dest: &Path) -> Result<(), PortError> {
        let result = self.inner.fetch(spec, dest);
        let input = json!({"repo": spec.to_string(), "dest": dest.display().to_string()});
        record_result(&self.recorder, "git", "fetch", &input, &result);
        result
    }

    fn current_commit(&self, path: &Path) -> Result<String, PortError> {
        let result = self.inner.current_commit(path);
        if let Ok(commit) = &result {
            self.recorder.lock().expect("recorder lock poisoned").set_commit(commit.clone());
        }
        record_result(&self.recorder, "git", "current_commit", &json!({"path": path.display().to_string()}), &result);
        result
    }
}
