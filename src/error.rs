
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CladariumError {
    #[error("Malformed clause: {clause}")]
    MalformedQuery { clause: String },
    #[error("Malformed operation: {reason}")]
    MalformedOperation { reason: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Data error: {0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, CladariumError>;

// Helper conversions
impl From<config::ConfigError> for CladariumError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<std::io::Error> for CladariumError {
    fn from(e: std::io::Error) -> Self { Self::Data(e.to_string()) }
}
impl From<serde_json::Error> for CladariumError {
    fn from(e: serde_json::Error) -> Self { Self::Data(e.to_string()) }
}
