//! Core library for framegate.
//!
//! Contains the key-path codec (dotted-path resolution and single-leaf
//! patch construction over JSON documents), one-time token generation, and
//! the session-bound handshake guard. This crate depends on
//! `framegate-session` for the token-set store trait and knows nothing
//! about HTTP or the upstream storage service.

pub mod error;
pub mod guard;
pub mod keypath;
pub mod token;
