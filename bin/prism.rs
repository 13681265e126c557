use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use prism::{Indexer, Settings};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("Failed to initialize logger")?;

    let settings = Settings::new()
        .context("Failed to load config.yaml. Please ensure it exists and is valid")?;

    let mut indexer = Indexer::new(&settings).context("Failed to initialize indexer")?;

    let cancellation_token = CancellationToken::new();

    let indexer_token = cancellation_token.child_token();
    let mut indexer_handle = tokio::spawn(async move {
        let result = indexer.run(indexer_token).await;
        if let Err(e) = &result {
            error!("Indexer failed: {:#}", e);
        }
        (indexer, result)
    });

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Indexer running. Press Ctrl+C to stop.");

    let shutdown = async {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
                },
                _ = sigterm_stream.recv() => {
                    info!("Received SIGTERM, exiting gracefully...");
                },
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
        }
    };

    let finished = tokio::select! {
        joined = &mut indexer_handle => Some(joined),
        _ = shutdown => None,
    };

    let (indexer, result) = match finished {
        Some(joined) => joined.context("Indexer task panicked")?,
        None => {
            cancellation_token.cancel();
            info!("Waiting for indexer to stop...");
            indexer_handle.await.context("Indexer task panicked")?
        },
    };

    // A failed run keeps the snapshot of its last completed chunk
    if result.is_err() {
        return result;
    }

    indexer.save_snapshot()?;

    let store = indexer.store();
    info!(
        "Snapshot saved: {} pairs, {} tokens, last block {:?}",
        store.pair_count(),
        store.token_count(),
        store.last_block
    );

    result
}
