//! Application layer of the colloquy chat client.
//!
//! Orchestrates the domain store and the backend gateway into the flows a
//! front end needs: history loading, sending with failure-to-transcript
//! handling, and conversation lifecycle actions.

pub mod chat_service;

pub use chat_service::{ChatService, LOGIN_REQUIRED_MESSAGE, SendOutcome};
