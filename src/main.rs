mod bootstrap;
mod config;
mod console;
mod report;
mod state;
mod types;
mod ws;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dotenv::dotenv;
use jainam_rs::JainamError;

use config::Config;
use state::Shared;
use types::StreamCommand;

#[tokio::main]
async fn main() -> Result<()> {
    // Basic logging: set RUST_LOG=info (or debug) to see output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    dotenv().ok();

    let cfg = Config::from_env()?;

    let manager = bootstrap::session_manager(&cfg);
    let session = bootstrap::bootstrap_session(&cfg, &manager).await?;
    let http = manager.get_api_client(&session);

    bootstrap::print_account(&manager, &http).await?;

    let shared = Shared::new();

    // WS control channel (main -> ws task)
    let (ws_ctl_tx, ws_ctl_rx) = mpsc::channel(64);

    // WS task
    let ws_handle = {
        let shared = shared.clone();
        let cfg = cfg.clone();
        let session = session.clone();
        tokio::spawn(async move { ws::task::run_ws(session, cfg, shared, ws_ctl_rx).await })
    };

    // Report task
    let report_handle = {
        let shared = shared.clone();
        let every = cfg.report_ms;
        tokio::spawn(async move { report::run_report(shared, every).await })
    };

    // Console task (stdin -> ws task)
    {
        let tx = ws_ctl_tx.clone();
        std::thread::spawn(move || {
            if let Err(e) = console::run_console(tx) {
                error!("console failed: {e}");
            }
        });
    }

    info!(instruments = cfg.instruments.len(), mode = %cfg.feed_mode(), "streaming; type `sub|depth|unsub|undepth EX|TOKEN` or `quit`");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, shutting down");
            let _ = ws_ctl_tx.send(StreamCommand::Shutdown).await;
        }
        _ = ws_ctl_tx.closed() => {}
    }

    match ws_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("stream task failed: {e:#}");
            let rejected = e
                .downcast_ref::<JainamError>()
                .is_some_and(JainamError::is_authentication);
            if rejected {
                manager.clear_session()?;
            }
        }
        Err(e) => error!("stream task panicked: {e}"),
    }
    report_handle.abort();

    for (key, q) in shared.snapshot() {
        report::log_quote(&key, &q);
    }

    Ok(())
}
