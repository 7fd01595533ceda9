//! Stop signals and the broadcast that fans them out.
//!
//! SIGINT (Ctrl+C) and, on Unix, SIGTERM both end the relay. The server
//! holds a receiver; `axum::serve` stops accepting and drains in-flight
//! streams once it fires.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Broadcast handle that tells the server to stop.
///
/// Clones share one channel, so the signal listener and test harnesses can
/// each hold a copy.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscriber. Harmless once the server is gone.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("Shutdown requested with no running server");
        }
    }

    /// Number of servers still waiting on this handle.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Spawn a task that triggers this handle on the first stop signal.
    pub fn listen_for_signals(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve when the process is asked to stop.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received"),
        _ = terminate => tracing::info!("SIGTERM received"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_trigger_stops_every_server() {
        let shutdown = Shutdown::new();
        let mut first = shutdown.subscribe();
        let mut second = shutdown.clone().subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
    }

    #[tokio::test]
    async fn signal_listener_does_not_fire_on_its_own() {
        let shutdown = Shutdown::default();
        let mut rx = shutdown.subscribe();
        let listener = shutdown.listen_for_signals();

        let fired = tokio::time::timeout(std::time::Duration::from_millis(50), rx.recv()).await;
        assert!(fired.is_err());

        listener.abort();
        shutdown.trigger();
        assert!(rx.recv().await.is_ok());
    }
}
