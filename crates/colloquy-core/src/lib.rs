//! Domain layer of the colloquy chat client.
//!
//! Holds the conversation models and in-memory store, the session binder,
//! identifier generation, the shared error type and the gateway trait the
//! transport layer implements. Nothing in this crate performs I/O beyond
//! reading the clock and the process random source.

pub mod conversation;
pub mod error;
pub mod gateway;
pub mod ident;
pub mod session;
pub mod user;

// Re-export common error type
pub use error::{ChatError, Result};
