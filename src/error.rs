use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to reach token endpoint: {0}")]
    Transport(String),
    #[error("Error exchanging token ({status}): {body}")]
    Exchange { status: u16, body: String },
    #[error("Failed to decode {0}")]
    Decode(String),
    #[error("Failed to access credential file: {0}")]
    Persistence(String),
}
