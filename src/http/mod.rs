//! HTTP protocol layer module
//!
//! Response building and JSON encoding, decoupled from the route table.

pub mod response;

// Re-export commonly used items
pub use response::{build_404_response, json_response};
