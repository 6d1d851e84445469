/// Error types shared by the component and its hosts
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("renderer error: {0}")]
    Render(String),
    #[error("frame scheduling failed: {0}")]
    Schedule(String),
    #[error("texture load failed for {path}: {reason}")]
    Texture { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
