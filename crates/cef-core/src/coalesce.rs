//! Quiet-period coalescing of rapid updates
//!
//! Values pushed in quick succession collapse to the last one, delivered once
//! the input has been quiet for the configured period. Dropping or closing
//! the handle flushes a pending value before the task stops.

use crate::error::ExplorerError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 64;

/// Handle to a coalescing task
#[derive(Debug)]
pub struct Coalescer<T> {
    sender: mpsc::Sender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Coalescer<T> {
    /// Spawn the task; `deliver` sees only settled values
    pub fn spawn<F, Fut>(quiet: Duration, deliver: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(run(receiver, quiet, deliver));
        Self { sender, task }
    }

    /// Push a new value, superseding any pending one
    ///
    /// # Errors
    /// [`ExplorerError::CoalescerClosed`] if the task has stopped
    pub async fn push(&self, value: T) -> Result<(), ExplorerError> {
        self.sender
            .send(value)
            .await
            .map_err(|_| ExplorerError::CoalescerClosed)
    }

    /// Flush the pending value and wait for the task to stop
    ///
    /// # Errors
    /// [`ExplorerError::Worker`] if delivery panicked
    pub async fn close(self) -> Result<(), ExplorerError> {
        let Self { sender, task } = self;
        drop(sender);
        task.await.map_err(|e| ExplorerError::worker(&e))
    }
}

async fn run<T, F, Fut>(mut receiver: mpsc::Receiver<T>, quiet: Duration, mut deliver: F)
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<T> = None;
    loop {
        let Some(value) = pending.take() else {
            match receiver.recv().await {
                Some(value) => pending = Some(value),
                None => break,
            }
            continue;
        };

        // Timer restarts with every iteration
        tokio::select! {
            next = receiver.recv() => match next {
                Some(newer) => pending = Some(newer),
                None => {
                    deliver(value).await;
                    break;
                }
            },
            () = tokio::time::sleep(quiet) => deliver(value).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording() -> (Arc<Mutex<Vec<u32>>>, impl FnMut(u32) -> std::future::Ready<()> + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v| {
            sink.lock().push(v);
            std::future::ready(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn burst_delivers_last_value_once() {
        let (seen, deliver) = recording();
        let coalescer = Coalescer::spawn(Duration::from_millis(300), deliver);

        for v in 1..=5 {
            coalescer.push(v).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*seen.lock(), vec![5]);
        coalescer.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_gaps_deliver_each_value() {
        let (seen, deliver) = recording();
        let coalescer = Coalescer::spawn(Duration::from_millis(100), deliver);

        coalescer.push(1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        coalescer.push(2).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_flushes_pending_value() {
        let (seen, deliver) = recording();
        let coalescer = Coalescer::spawn(Duration::from_secs(60), deliver);

        coalescer.push(7).await.unwrap();
        coalescer.push(8).await.unwrap();
        coalescer.close().await.unwrap();

        assert_eq!(*seen.lock(), vec![8]);
    }
}
