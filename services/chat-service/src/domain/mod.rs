// Modul domain untuk Chat Service
pub mod conversation;
pub mod identity;
pub mod message;

// Export publik untuk handlers, services dan repositories
pub use conversation::*;
pub use identity::*;
pub use message::*;
