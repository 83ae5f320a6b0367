use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpkeepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    #[error("Required tool '{tool}' is missing: {reason}")]
    ToolMissing { tool: String, reason: String },

    #[error("Required task '{0}' failed, remaining tasks were not run")]
    FatalTaskFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UpkeepError>;
