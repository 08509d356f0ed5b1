// src/error.rs

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("probe '{0}' is already registered")]
    DuplicateProbe(String),

    #[error("health cache has not been populated yet")]
    CacheEmpty,
}
