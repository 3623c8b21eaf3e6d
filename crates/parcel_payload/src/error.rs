use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PayloadError {
    #[error("Failed to encode serializable extra `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: ron::Error,
    },
}
