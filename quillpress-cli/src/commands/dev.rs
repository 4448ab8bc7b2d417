//! Dev server command implementation.

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::ServeDir;

/// Build the site, then serve the output directory.
pub async fn dev_server(config_path: &Path, port: Option<u16>) -> Result<()> {
    let config = super::build::load_config(config_path)?;
    super::build::build_site_with_config(config.clone()).await?;

    let port = port.unwrap_or(config.server.port);
    let output_dir = config.output_dir();

    tracing::info!("Serving {:?} on http://localhost:{}", output_dir, port);
    println!("\nServing at http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let app = Router::new().fallback_service(ServeDir::new(&output_dir));
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    axum::serve(listener, app)
        .await
        .context("Dev server failed")?;

    Ok(())
}
