use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ourbear_core::{
    config::Config, media::MediaSelector, poller::Poller, trigger::TriggerClassifier,
};
use ourbear_telegram::TelegramClient;

fn main() -> anyhow::Result<()> {
    // `.env` is applied to the process env here, while still single-threaded,
    // so it can also carry RUST_LOG.
    let cfg = Config::load()?;
    ourbear_core::logging::init("ourbear")?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cfg))
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    info!(
        api = %cfg.api_base_url,
        poll_delay_ms = cfg.poll_delay.as_millis() as u64,
        timeout_ms = cfg.request_timeout.as_millis() as u64,
        keywords = cfg.trigger_keywords.len(),
        media = cfg.media_catalog.len(),
        "starting service"
    );

    let api = Arc::new(TelegramClient::from_config(&cfg)?);
    let classifier = TriggerClassifier::new(&cfg.trigger_keywords)?;
    let selector = MediaSelector::new(cfg.media_catalog.clone());
    let poller = Poller::new(api, classifier, selector, cfg.poll_delay);

    let cancel = CancellationToken::new();
    tokio::spawn(forward_shutdown_signals(cancel.clone()));

    let cause = poller.run(cancel).await;
    info!(%cause, "service stopped");
    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM. If the handlers cannot be installed the
/// token is left alone and the process runs until killed.
async fn forward_shutdown_signals(token: CancellationToken) {
    match wait_for_shutdown_signal().await {
        Ok(()) => {
            info!("shutdown signal received");
            token.cancel();
        }
        Err(e) => warn!(error = %e, "failed to listen for shutdown signals"),
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> ourbear_core::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = term.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> ourbear_core::Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
