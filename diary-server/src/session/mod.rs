//! Per-client conversation session state

pub mod registry;
pub mod state;

pub use registry::SessionRegistry;
pub use state::{ConversationSession, DiaryState, SequenceError, SessionSnapshot, Speaker};
