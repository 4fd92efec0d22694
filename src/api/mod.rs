mod api_error;
mod client;
pub mod models;
mod session;

pub use api_error::ApiError;
pub use client::{ApiFetcher, ImoveisClient};
pub use session::Session;
