pub mod capture;
pub mod error;
pub mod render;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod traits;
pub mod transcript;
