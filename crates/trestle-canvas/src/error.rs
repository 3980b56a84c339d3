pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] trestle_core::Error),
}

/// Why the layout engine did not produce a placement. Consumed by the adapter, which falls back
/// to the grid instead of surfacing it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout engine failed: {0}")]
    Engine(String),

    #[error("layout engine panicked: {0}")]
    Panicked(String),

    #[error("layout engine missed its deadline")]
    TimedOut,
}

impl From<otter::Error> for LayoutError {
    fn from(err: otter::Error) -> Self {
        LayoutError::Engine(err.to_string())
    }
}
