//! JSON-RPC API Layer
//!
//! Exposes update start/status to the web frontend over JSON-RPC 2.0.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::RpcServer;
