pub mod backend;
pub mod config_store;
pub mod defaults;
pub mod fs;
pub mod profile_store;
pub mod tts;

pub use backend::{FormApiBackend, SessionApiBackend, backend_from_config};
pub use config_store::ConfigStore;
pub use profile_store::FileProfileStorage;
pub use tts::CommandSynthesizer;
