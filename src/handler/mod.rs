//! Request handler module
//!
//! Responsible for request routing dispatch to the fixed JSON endpoints.

pub mod router;

// Re-export main entry point
pub use router::{handle_request, RequestContext, RouteTable};
