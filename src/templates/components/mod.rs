pub mod card;
pub mod error;
pub mod filter_form;

pub use card::listing_card;
pub use error::{error_banner, html_error_response};
pub use filter_form::filter_form;
