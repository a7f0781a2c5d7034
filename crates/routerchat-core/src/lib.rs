pub mod ai;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
pub mod store;
pub mod text;

// Re-export main types for convenience
pub use ai::OpenRouterClient;
pub use config::{Config, Settings};
pub use error::{CompletionError, ConfigError, SessionError, StoreError};
pub use models::Model;
pub use session::{PendingTurn, Session, TurnPhase};
pub use state::{default_transcript, Message, Role, Transcript, DEFAULT_SYSTEM_PROMPT};
pub use store::TranscriptStore;
