//! MCP tool handlers
//!
//! Each tool's implementation lives in the file for its area; `lib.rs` only
//! declares the tool surface.

pub mod calendar;
pub mod history;
pub mod planning;
pub mod session;
pub mod weather;
