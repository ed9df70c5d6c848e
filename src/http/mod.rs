//! HTTP listener.
//!
//! The server includes:
//! - Startup announcement of the endpoint URLs on stdout
//! - Graceful shutdown on SIGTERM/SIGINT

mod server;
mod shutdown;

pub use server::{serve, start_server, startup_lines, ServerError};
pub use shutdown::shutdown_signal;
