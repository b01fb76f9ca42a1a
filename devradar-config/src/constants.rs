//! Environment variable names and built-in defaults.

pub const ENV_CONFIG_PATH: &str = "DEVRADAR_CONFIG_PATH";
pub const ENV_CONFIG_JSON: &str = "DEVRADAR_CONFIG_JSON";
pub const ENV_SERVER_URL: &str = "DEVRADAR_SERVER_URL";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3333";
pub const DEFAULT_SEARCH_PATH: &str = "/search";
pub const DEFAULT_EVENTS_PATH: &str = "/events";

/// Files probed, relative to the working directory, when no env override is set.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "devradar.toml",
    "devradar.json",
    "config/devradar.toml",
    "config/devradar.json",
];
