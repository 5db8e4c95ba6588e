use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

/// Cancellation tokens for in-flight requests, keyed by request id.
#[derive(Debug, Default)]
pub struct CancelRegistry {
    senders: Mutex<HashMap<String, broadcast::Sender<()>>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn senders(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<()>>> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, id: &str) -> broadcast::Receiver<()> {
        let (tx, rx) = broadcast::channel(1);
        self.senders().insert(id.to_string(), tx);
        rx
    }

    pub fn cancel(&self, id: &str) -> bool {
        if let Some(tx) = self.senders().remove(id) {
            let _ = tx.send(());
            return true;
        }
        false
    }

    /// Cancel every registered request, returning how many were pending.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.senders().drain().collect();
        for (_, tx) in &drained {
            let _ = tx.send(());
        }
        drained.len()
    }

    pub fn remove(&self, id: &str) {
        self.senders().remove(id);
    }
}

/// Drive `future` until it completes or the request is cancelled.
pub async fn until_cancelled<F>(future: F, cancel_rx: &mut broadcast::Receiver<()>) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        output = future => Some(output),
        _ = cancel_rx.recv() => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let registry = CancelRegistry::new();
        let mut rx = registry.register("a");
        let output = until_cancelled(async { 7 }, &mut rx).await;
        assert_eq!(output, Some(7));
        registry.remove("a");
        assert!(!registry.cancel("a"));
    }

    #[tokio::test]
    async fn cancelled_request_yields_nothing() {
        let registry = CancelRegistry::new();
        let mut rx = registry.register("a");
        assert!(registry.cancel("a"));
        let output = until_cancelled(std::future::pending::<()>(), &mut rx).await;
        assert_eq!(output, None);
        assert!(!registry.cancel("a"));
    }

    #[tokio::test]
    async fn cancel_all_signals_every_request() {
        let registry = CancelRegistry::new();
        let mut first = registry.register("a");
        let mut second = registry.register("b");
        assert_eq!(registry.cancel_all(), 2);
        assert_eq!(until_cancelled(std::future::pending::<()>(), &mut first).await, None);
        assert_eq!(until_cancelled(std::future::pending::<()>(), &mut second).await, None);
    }
}
