use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use maud::Markup;

/// HTML response, optionally setting a cookie (new grid sessions).
pub fn html_response_with_cookie(markup: Markup, set_cookie: Option<String>) -> ResultResp {
    let mut builder = ResponseBuilder::new()
        .status(200)
        .header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref())
        .header("Cache-Control", "no-store");

    if let Some(cookie) = set_cookie {
        builder = builder.header("Set-Cookie", cookie);
    }

    builder
        .body(Body::from(markup.into_string()))
        .map_err(|_| ServerError::InternalError)
}

pub fn text_response(status: u16, text: &'static str) -> ResultResp {
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::TEXT_PLAIN_UTF_8.as_ref())
        .body(Body::from(text))
        .map_err(|_| ServerError::InternalError)
}
