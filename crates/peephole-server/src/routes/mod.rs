//! Route handlers for the HTTP API.

pub mod channel;
pub mod health;
