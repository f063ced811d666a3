use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Comment output requires a publisher")]
    MissingPublisher,

    #[error("Environment variable '{0}' is required for comment output")]
    MissingEnvVar(String),

    #[error("Failed to resolve token: {0}")]
    Token(#[from] crate::secrets::SecretError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Publishing comment failed ({status}): {body}")]
    Publish { status: u16, body: String },

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OutputError>;
