//! framegate HTTP server.
//!
//! Wires the core library and session store into a running Axum server:
//! two iframe feature areas (`/info` read-only, `/input` read/write), each
//! guarded by the one-time token handshake, in front of an upstream
//! mutual-TLS storage API.

pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod tls;
