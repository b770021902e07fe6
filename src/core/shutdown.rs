//! # OS signals as quit messages.
//!
//! With [`Config::os_signals`](crate::Config::os_signals) set, the dispatcher
//! starts a bridge task that waits for a termination signal and publishes an
//! empty message on the quit channel. The run loop treats it like any other
//! quit, so there is a single shutdown path.
//!
//! ```text
//! SIGINT / SIGTERM / SIGQUIT (unix), Ctrl-C (elsewhere)
//!   └─► forward_os_signals ──► bus.publish(<quit_channel>) ──► run loop exits
//!                  ▲
//!   shutdown hook ─┘ cancels the bridge when the loop stops first
//! ```

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::messages::{Message, MessageBus, Payload};

/// Resolves on the first SIGINT, SIGTERM or SIGQUIT.
///
/// Exposed for embedders that run the dispatcher without the built-in bridge
/// and want to publish their own quit message. Fails only if a handler cannot
/// be installed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut handlers = [
        signal(SignalKind::interrupt())?,
        signal(SignalKind::terminate())?,
        signal(SignalKind::quit())?,
    ];
    let [interrupt, terminate, quit] = &mut handlers;
    tokio::select! {
        _ = interrupt.recv() => debug!("SIGINT"),
        _ = terminate.recv() => debug!("SIGTERM"),
        _ = quit.recv() => debug!("SIGQUIT"),
    }
    Ok(())
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Spawns a bridge that publishes a message on `quit_channel` when a termination
/// signal arrives. The bridge exits without publishing once `token` is cancelled.
pub(crate) fn forward_os_signals(
    bus: MessageBus,
    quit_channel: String,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            res = wait_for_shutdown_signal() => match res {
                Ok(()) => {
                    debug!(channel = %quit_channel, "termination signal received");
                    if let Err(err) = bus.publish(Message::new(quit_channel, Payload::Empty)) {
                        warn!(error = %err, label = err.as_label(), "failed to publish quit");
                    }
                }
                Err(err) => warn!(error = %err, "failed to install signal handlers"),
            }
        }
    })
}
