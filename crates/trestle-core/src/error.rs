pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("architecture JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid architecture: {message}")]
    InvalidArchitecture { message: String },
}
