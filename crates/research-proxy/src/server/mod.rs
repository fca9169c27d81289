//! HTTP server for the research proxy.

pub mod transport;

use std::net::SocketAddr;

use axum::Router;

use crate::service::ResearchService;

pub use transport::create_router;

/// Research proxy HTTP server.
#[derive(Debug)]
pub struct ResearchServer {
    service: ResearchService,
}

impl ResearchServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(service: ResearchService) -> Self {
        Self { service }
    }

    /// Build the router without binding a socket.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(self.service.clone())
    }

    /// Serve HTTP until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        if !self.service.has_api_key() {
            tracing::warn!("Upstream API key not configured; research requests will fail");
        }

        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Backend server running on http://{}", listener.local_addr()?);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
