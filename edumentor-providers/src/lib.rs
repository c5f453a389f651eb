pub mod endpoint;
pub mod form_api;
pub mod multipart;
pub mod parse;
pub mod request;
pub mod runtime;
pub mod session_api;
