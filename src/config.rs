//! Configuration types.
//!
//! The retry cap and step ceiling are injected into the pipeline at
//! construction so deployments (and tests) can tune them without touching
//! module constants.

use std::path::PathBuf;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Maximum number of refinement passes before a ticket escalates.
    pub max_retries: u32,
    /// Hard ceiling on stage executions per run. A transition-table bug
    /// terminates the run with a fault instead of cycling forever.
    pub step_limit: u32,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            step_limit: 50,
        }
    }
}

impl TriageConfig {
    /// Build from environment variables, falling back to defaults.
    ///
    /// - `TRIAGE_MAX_RETRIES`
    /// - `TRIAGE_STEP_LIMIT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_u32("TRIAGE_MAX_RETRIES", defaults.max_retries),
            step_limit: env_u32("TRIAGE_STEP_LIMIT", defaults.step_limit),
        }
    }
}

/// HTTP server and storage configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP surface.
    pub port: u16,
    /// Directory holding per-category knowledge documents.
    pub data_dir: PathBuf,
    /// Path of the append-only escalation log.
    pub escalation_log: PathBuf,
    /// Directory for the service log file.
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("./data"),
            escalation_log: PathBuf::from("./data/escalations.csv"),
            log_dir: PathBuf::from("."),
        }
    }
}

impl ServerConfig {
    /// Build from environment variables, falling back to defaults.
    ///
    /// - `TRIAGE_PORT`
    /// - `TRIAGE_DATA_DIR`
    /// - `TRIAGE_ESCALATION_LOG`
    /// - `TRIAGE_LOG_DIR`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("TRIAGE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: env_path("TRIAGE_DATA_DIR", defaults.data_dir),
            escalation_log: env_path("TRIAGE_ESCALATION_LOG", defaults.escalation_log),
            log_dir: env_path("TRIAGE_LOG_DIR", defaults.log_dir),
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.step_limit, 50);
    }

    #[test]
    fn server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.escalation_log, PathBuf::from("./data/escalations.csv"));
    }
}
