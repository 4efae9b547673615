//! Error types shared across the service.

pub mod types;

pub use types::AppError;

/// Result alias used by the web layer.
pub type ApiResult<T> = Result<T, AppError>;
