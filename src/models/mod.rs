pub mod messages;

// Re-export important types
pub use messages::*;
