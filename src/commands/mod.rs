//! Command dispatch and handlers.

pub mod generate;

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::cli::Cli;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::docs::Section;
use crate::repo::RepoSpec;

/// Records git and model interactions to the named cassette file.
pub const RECORD_VAR: &str = "REPOCONTEXT_RECORD";
/// Serves clock, git and model interactions from the named cassette file.
pub const REPLAY_VAR: &str = "REPOCONTEXT_REPLAY";

/// Runs the documentation pipeline for a parsed command line.
///
/// `REPOCONTEXT_REPLAY` takes precedence over `REPOCONTEXT_RECORD`; without
/// either the live adapters are used.
///
/// # Errors
///
/// Returns an error string if configuration, argument validation or any
/// pipeline stage fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;
    let spec: RepoSpec = cli.repo.parse().map_err(|e: crate::Error| e.to_string())?;
    let section = cli
        .section
        .as_deref()
        .map(str::parse::<Section>)
        .transpose()
        .map_err(|e| e.to_string())?;

    let ctx = if let Ok(path) = env::var(REPLAY_VAR) {
        info!(cassette = %path, "replaying recorded interactions");
        ServiceContext::replaying(&PathBuf::from(path))?
    } else if let Ok(path) = env::var(RECORD_VAR) {
        info!(cassette = %path, "recording interactions");
        ServiceContext::recording(&config, &PathBuf::from(path), &cli.repo)?
    } else {
        ServiceContext::live(&config)?
    };

    // Dropping the context writes any recording, even after a failure.
    let result = generate::run(&ctx, &config, &spec, section);
    drop(ctx);
    result.map_err(|e| e.to_string())
}
