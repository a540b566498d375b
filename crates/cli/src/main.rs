//! Process entry point (C11): parse args, stand up a `NodeState`, join
//! an existing ring (or start a new one), and serve the HTTP surface of
//! §6 until `/shutdown` or a termination signal.

use clap::Parser;
use cli::{build_router, Args};
use corelib::config::RingConfig;
use corelib::node::NodeState;
use replication::ReplicatedStore;
use std::sync::Arc;
use streaming::HttpTransport;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let host = args.listen_host();
    let config = RingConfig::new(args.m, args.replicas);
    let node = Arc::new(NodeState::new(host.clone(), config));
    let transport = Arc::new(HttpTransport::new());

    if args.boot != host {
        corelib::membership::join(&node, transport.as_ref(), &args.boot).await?;
        tracing::info!(boot = %args.boot, "joined ring");
    } else {
        tracing::info!("starting a new ring");
    }

    let store = Arc::new(ReplicatedStore::new(node.clone(), transport.clone()));
    let (router, shutdown_rx) = build_router(node, store);

    let listener = tokio::net::TcpListener::bind(&host).await?;
    tracing::info!(%host, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await?;

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
