// errors.rs
use thiserror::Error;

/// Errors raised while handling a front-end request.
/// Fetch failures are not here: the grid keeps those as its own error state.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Internal Server Error")]
    InternalError,
}
