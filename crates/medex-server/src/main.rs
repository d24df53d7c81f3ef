mod assist;
mod config;
mod error;
mod http;
mod mcp;
mod service;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use medex_common::chat::ChatClientConfig;
use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Config, Mode, Transport};
use mcp::MedexMcpServer;
use service::ExtractionService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stderr only: stdout carries MCP JSON-RPC in stdio mode
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting medex");

    let config = Config::from_env()?;
    info!(
        transport = ?config.transport,
        mode = ?config.mode,
        categories_path = ?config.categories_path,
        "configuration loaded"
    );

    let categories = Arc::new(config.load_categories()?);
    info!(categories = categories.categories().len(), "category dictionary loaded");

    let chat = if config.mode == Mode::Keyword {
        ChatClientConfig::default()
    } else {
        ChatClientConfig::from_env()
    };
    let service = ExtractionService::from_config(&config, categories, chat)?;
    info!(mode = ?service.mode(), "extraction service ready");

    match config.transport {
        Transport::Stdio => serve_stdio(service).await,
        Transport::Http => serve_http(&config, service).await,
    }
}

async fn serve_stdio(service: ExtractionService) -> anyhow::Result<()> {
    info!("MCP server ready, serving on stdio");
    let service = MedexMcpServer::new(service)
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}

async fn serve_http(config: &Config, service: ExtractionService) -> anyhow::Result<()> {
    let app = http::router(service, config.static_dir());

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;
    info!("HTTP server shut down");
    Ok(())
}
