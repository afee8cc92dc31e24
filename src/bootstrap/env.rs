use std::path::{Path, PathBuf};

/// Configuration file read before anything else, relative to the working
/// directory. Variables already set in the environment win.
pub const CONFIG_FILE: &str = "config";

pub enum Loaded {
    File(PathBuf),
    Missing,
    Invalid(dotenvy::Error),
}

/// Runs before tracing is up, so the outcome is reported separately.
pub async fn init_env() -> Loaded {
    match dotenvy::from_path(Path::new(CONFIG_FILE)) {
        Ok(()) => Loaded::File(PathBuf::from(CONFIG_FILE)),
        Err(err) if err.not_found() => Loaded::Missing,
        Err(err) => Loaded::Invalid(err),
    }
}

pub fn report(loaded: &Loaded) {
    match loaded {
        Loaded::File(path) => ::tracing::info!(path = %path.display(), "configuration file loaded"),
        Loaded::Missing => ::tracing::warn!("no `{CONFIG_FILE}` file, using the environment only"),
        Loaded::Invalid(err) => ::tracing::error!(error = %err, "cannot parse `{CONFIG_FILE}`, ignoring it"),
    }
}
