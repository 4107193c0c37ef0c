/// Crate-wide result alias.
pub type FilmstripResult<T> = Result<T, FilmstripError>;

/// Error type for sequence loading, playback, and rendering.
///
/// Individual frame-fetch failures never surface here: the loader absorbs
/// them into an unusable slot and the nearest-neighbor query papers over the
/// gap. This enum covers programming and environment errors only.
#[derive(thiserror::Error, Debug)]
pub enum FilmstripError {
    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// Asset acquisition or decode failure.
    #[error("asset error: {0}")]
    Asset(String),

    /// Surface or compositing failure.
    #[error("render error: {0}")]
    Render(String),

    /// Any other error, preserved with its source chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FilmstripError {
    /// Build a validation error from a message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an asset error from a message.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a render error from a message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
