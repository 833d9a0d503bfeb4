pub mod config;
pub use config::{
    AppConfigImpl, OpenAiConfig, ServerConfig, SessionConfig, SpotifyConfig, UploadConfig,
};

pub mod openai;
pub use openai::OpenAiVision;

pub mod session_store;
pub use session_store::InMemorySessionStore;

pub mod spotify;
pub use spotify::SpotifyCatalog;

pub mod upload;
pub use upload::{ScopedUpload, UploadStorage};
