//! Error types for the trail environment abstraction.

use thiserror::Error;

/// Errors that can occur at the host renderer seam.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Geometry was pushed to a target that was never acquired (or already released)
    #[error("Render target not acquired")]
    NotAcquired,
    
    /// The target already backs another renderable
    #[error("Render target already acquired as {0}")]
    AlreadyAcquired(String),
    
    /// Geometry upload failed on the host side
    #[error("Upload error: {0}")]
    Upload(String),
    
    /// The host refused the geometry (bad sizes, etc.)
    #[error("Geometry rejected: {0}")]
    Rejected(String),
}

impl EnvError {
    /// Creates an upload error.
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }
    
    /// Creates a rejection error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}
