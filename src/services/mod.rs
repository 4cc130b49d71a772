//! Completion side-effect services
//!
//! This module decides which completion actions run and delivers them to the
//! desktop.

pub mod completion;
pub mod system;

// Re-export main types
pub use completion::{CompletionActions, CompletionDispatcher, CompletionNotice};
pub use system::SystemActions;
