// Connection handling module
// Accepts a single TCP connection and serves it on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::state::ServerState;
use crate::handler::{self, RequestContext};
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// Returns `false` when the connection was rejected.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<ServerState>,
) -> bool {
    // Increment first, then check, so concurrent accepts cannot overshoot
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return false;
        }
    }

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state));
    true
}

/// Serve one connection with HTTP/1.1 on a spawned task.
///
/// Requests always run to completion. With keep-alive on, a connection that
/// waits longer than `keep_alive_timeout` for the next request head is closed;
/// with `keep_alive_timeout = 0` keep-alive is off and nothing times out.
/// The counter is released when the task ends.
fn handle_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<ServerState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.timer(TokioTimer::new());
        builder.keep_alive(state.config.performance.keep_alive_timeout > 0);
        builder.header_read_timeout(idle_timeout(state.config.performance.keep_alive_timeout));

        let ctx = Arc::new(RequestContext {
            remote_addr: peer_addr.ip().to_string(),
            access_log: state.config.logging.access_log,
            access_log_format: state.config.logging.access_log_format.clone(),
        });

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                let ctx = Arc::clone(&ctx);
                async move { handler::handle_request(req, &state.routes, &ctx).await }
            }),
        );

        // Write failures (client gone mid-response) end up here and are only logged
        match conn.await {
            Ok(()) => {}
            // Idle keep-alive connection reaching its limit
            Err(err) if err.is_timeout() => {}
            Err(err) => logger::log_connection_error(&err),
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

/// How long an open connection may wait for the next request head
const fn idle_timeout(keep_alive_timeout: u64) -> Option<Duration> {
    if keep_alive_timeout > 0 {
        Some(Duration::from_secs(keep_alive_timeout))
    } else {
        None
    }
}
