use std::fmt;
use std::path::PathBuf;

/// Errors that stop a tuning session before (or instead of) running iterations.
///
/// Timeouts and garbage output from the engine or the match runner are not
/// represented here; the estimators absorb those as a neutral score.
#[derive(Debug)]
pub enum TunerError {
    EngineNotFound(PathBuf),
    MatchRunnerUnavailable(String),
    InvalidParameter(String),
    Config(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Toml(toml::de::Error),
}

impl fmt::Display for TunerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunerError::EngineNotFound(path) => {
                write!(f, "Engine not found: {}", path.display())
            }
            TunerError::MatchRunnerUnavailable(runner) => {
                write!(f, "Match runner not available: {}", runner)
            }
            TunerError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            TunerError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            TunerError::Io(e) => write!(f, "I/O error: {}", e),
            TunerError::Json(e) => write!(f, "JSON error: {}", e),
            TunerError::Toml(e) => write!(f, "TOML error: {}", e),
        }
    }
}

impl std::error::Error for TunerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TunerError::Io(e) => Some(e),
            TunerError::Json(e) => Some(e),
            TunerError::Toml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TunerError {
    fn from(error: std::io::Error) -> Self {
        TunerError::Io(error)
    }
}

impl From<serde_json::Error> for TunerError {
    fn from(error: serde_json::Error) -> Self {
        TunerError::Json(error)
    }
}

impl From<toml::de::Error> for TunerError {
    fn from(error: toml::de::Error) -> Self {
        TunerError::Toml(error)
    }
}
