//! HTTP API module.
//!
//! This module provides the HTTP server, its response types and the log
//! stream shared by the whole crate.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{roster_response, router, start_server};
pub use types::*;
