pub mod cookies;
pub mod token;
