// Server state module
// Everything a connection task needs, built once before the first accept

use std::sync::atomic::AtomicUsize;

use crate::config::Config;
use crate::handler::RouteTable;

/// Shared, read-only serving state (apart from the connection counter)
pub struct ServerState {
    pub config: Config,
    pub routes: RouteTable,
    pub active_connections: AtomicUsize,
}

impl ServerState {
    pub const fn new(config: Config, routes: RouteTable) -> Self {
        Self {
            config,
            routes,
            active_connections: AtomicUsize::new(0),
        }
    }
}
