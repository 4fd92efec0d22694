pub mod html;

use crate::errors::ServerError;
use astra::Response;

pub type ResultResp = Result<Response, ServerError>;

pub use html::{html_response_with_cookie, text_response};
