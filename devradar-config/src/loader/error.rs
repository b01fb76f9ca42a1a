use crate::validation::ConfigGuardRailError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config from {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
}
