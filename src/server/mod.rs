// Server module entry point
// Listener creation, accept loop and per-connection serving

pub mod connection;
pub mod listener;
pub mod state;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use state::ServerState;
