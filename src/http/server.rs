//! HTTP server startup logic.

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::AppConfig;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Human-readable lines announcing where the endpoints are reachable.
pub fn startup_lines(port: u16) -> Vec<String> {
    vec![
        format!("Server listening on port {}", port),
        format!("Health check available at: http://localhost:{}/health", port),
        format!("System info available at: http://localhost:{}/system", port),
        format!("Home page available at: http://localhost:{}/", port),
    ]
}

/// Bind the configured address and serve until SIGINT/SIGTERM.
///
/// This function blocks until the server shuts down. A bind failure is
/// returned to the caller; nothing is announced in that case.
pub async fn start_server(app: Router, config: &AppConfig) -> Result<(), ServerError> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind((config.http.host.as_str(), config.http.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let local = listener.local_addr()?;
    tracing::info!(%local, environment = %config.environment, "Starting HTTP server");
    for line in startup_lines(local.port()) {
        println!("{}", line);
    }

    serve(listener, app, shutdown::shutdown_signal()).await
}

/// Serve `app` on an already bound listener until `signal` resolves.
///
/// In-flight requests are drained before this returns.
pub async fn serve<F>(listener: TcpListener, app: Router, signal: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}
