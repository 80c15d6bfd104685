//! Adapters that answer port calls from a cassette.

pub mod clock;
pub mod git;
pub mod llm;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::PortError;

pub use clock::ReplayingClock;
pub use git::ReplayingGitRepo;
pub use llm::ReplayingLlmClient;

/// Output of the next recorded `port::method` call.
pub(crate) fn next_output(replayer: &Mutex<CassetteReplayer>, port: &str, method: &str) -> serde_json::Value {
    let mut replayer = replayer.lock().expect("replayer lock poisoned");
    replayer.next_interaction(port, method).output
}

/// Decodes the `{"ok": value}` / `{"err": "message"}` convention.
///
/// A bare value without either key is treated as `ok`.
pub(crate) fn replay_result<T: DeserializeOwned>(output: serde_json::Value, context: &str) -> Result<T, PortError> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = match output {
        serde_json::Value::Object(mut map) if map.contains_key("ok") => map.remove("ok").unwrap_or_default(),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_and_bare_values_decode() {
        let v: String = replay_result(json!({"ok": "abc"}), "t").unwrap();
        assert_eq!(v, "abc");
        let v: String = replay_result(json!("bare"), "t").unwrap();
        assert_eq!(v, "bare");
        replay_result::<()>(json!({"ok": null}), "t").unwrap();
    }

    #[test]
    fn err_becomes_port_error() {
        let err = replay_result::<String>(json!({"err": "clone failed"}), "t").unwrap_err();
        assert_eq!(err.to_string(), "clone failed");
    }

    #[test]
    fn wrong_shape_names_context() {
        let err = replay_result::<u32>(json!({"ok": "nope"}), "git::current_commit").unwrap_err();
        assert!(err.to_string().starts_with("git::current_commit: failed to deserialize"));
    }
}
