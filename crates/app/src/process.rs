use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Install the global subscriber: compact output on stderr, filtered by
/// `RUST_LOG` with `level` as the default directive.
///
/// The returned guard must be kept alive for logs to flush.
pub fn init_logging(level: tracing::Level) -> WorkerGuard {
    let (stderr_writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stderr_writer)
        .with_filter(env_filter);

    // a subscriber may already be installed
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();

    register_panic_logger();
    guard
}

/// Registers a panic hook that logs panics using the `tracing` crate
pub fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

/// Spawns a task that listens for SIGINT and SIGTERM and sends a shutdown
/// signal via a watch.
pub fn graceful_shutdown_blocker() -> std::io::Result<(JoinHandle<()>, watch::Receiver<()>)> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let (tx, rx) = watch::channel(());

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::debug!("shutting down on SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::debug!("shutting down on SIGTERM");
            }
        }

        let _ = tx.send(());
    });

    Ok((handle, rx))
}
