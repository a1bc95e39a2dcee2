//! Stop handle shared by both producers.

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle to a running producer task.
///
/// `stop` signals the task, waits for it to flush and release its source,
/// and is idempotent: the second and later calls return immediately.
pub struct ProducerHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ProducerHandle {
    pub(crate) fn new(stop: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
        Self {
            stop: Some(stop),
            task: Some(task),
        }
    }

    /// Stop the producer and wait for its task to finish.
    pub async fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The task may already be gone after a source fault.
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether `stop` has already run to completion.
    pub fn is_stopped(&self) -> bool {
        self.task.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_twice_is_harmless() {
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let _ = rx.await;
        });
        let mut handle = ProducerHandle::new(tx, task);
        assert!(!handle.is_stopped());
        handle.stop().await;
        assert!(handle.is_stopped());
        handle.stop().await;
        assert!(handle.is_stopped());
    }
}
