use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use eks_mcp_server::cli::{self, Cli};
use eks_mcp_server::cloudwatch::{
    CloudWatchHandler, SdkLogsClient, SdkMetricsClient, load_sdk_config,
};
use eks_mcp_server::embedded;
use eks_mcp_server::knowledge_base::{KnowledgeBaseHandler, SigV4Signer};
use eks_mcp_server::stdio::EksMcpServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol
    env_logger::init();

    let cli = Cli::parse();

    if cli.list_tools {
        println!("Available tools:");
        for tool in cli::available_tools() {
            println!("  - {tool}");
        }
        return Ok(());
    }

    if cli.list_toolsets {
        println!("Available bundled toolsets:");
        for toolset in embedded::list_toolsets() {
            println!("  - {toolset}");
        }
        return Ok(());
    }

    // Get enabled tools from CLI (--tool/--tools/--toolset)
    let enabled_tools = cli.enabled_tools().await?;

    // Validate before touching AWS
    if let Some(ref tools) = enabled_tools {
        let invalid = cli::unknown_tools(tools);
        if !invalid.is_empty() {
            eprintln!("Error: Invalid tool names specified:");
            for tool in &invalid {
                eprintln!("  - {tool}");
            }
            eprintln!();
            eprintln!("Available tools:");
            for tool in cli::available_tools() {
                eprintln!("  - {tool}");
            }
            eprintln!();
            eprintln!("Tip: Use --list-tools to see all available tools");
            return Err(anyhow::anyhow!("Invalid tool names specified"));
        }
    }

    let config = cli.server_config()?;
    log::info!("Starting EKS MCP Server{}", config.mode_description());

    let sdk_config = load_sdk_config(config.region.clone()).await;
    let cloudwatch = CloudWatchHandler::new(
        Arc::new(SdkLogsClient::new(&sdk_config)),
        Arc::new(SdkMetricsClient::new(&sdk_config)),
        &config,
    );
    let knowledge_base = KnowledgeBaseHandler::new(
        reqwest::Client::new(),
        Arc::new(SigV4Signer::for_knowledge_base(&sdk_config)),
    )
    .with_endpoint(config.knowledge_base_endpoint.clone());

    let shutdown_token = tokio_util::sync::CancellationToken::new();

    // Spawn cross-platform signal handler
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        wait_for_interrupt().await;
        log::debug!("Received interrupt signal, shutting down");
        signal_token.cancel();
    });

    let server = EksMcpServer::new(config, cloudwatch, knowledge_base, enabled_tools);
    server.serve_stdio(shutdown_token).await?;

    Ok(())
}

/// Wait for interrupt signal (cross-platform)
#[cfg(unix)]
async fn wait_for_interrupt() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm_result = signal(SignalKind::terminate());
    let mut sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result.as_mut(), sigint_result.as_mut()) {
        (Ok(sigterm), Ok(sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
        }
        (Ok(sigterm), Err(_)) => {
            let _ = sigterm.recv().await;
        }
        (Err(_), Ok(sigint)) => {
            let _ = sigint.recv().await;
        }
        (Err(_), Err(_)) => {
            let () = std::future::pending().await;
        }
    }
}

/// Wait for interrupt signal (cross-platform)
#[cfg(windows)]
async fn wait_for_interrupt() {
    match tokio::signal::windows::ctrl_c() {
        Ok(mut ctrl_c) => {
            let _ = ctrl_c.recv().await;
        }
        Err(_) => {
            let () = std::future::pending().await;
        }
    }
}
