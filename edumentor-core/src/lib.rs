pub mod audio_format;
pub mod config;
pub mod errors;
pub mod mode;
pub mod profile;
pub mod speech;
pub mod text;
pub mod types;

// Keep the public surface small and intentional.
pub use audio_format::*;
pub use config::*;
pub use errors::*;
pub use mode::*;
pub use profile::*;
pub use speech::*;
pub use text::*;
pub use types::*;
