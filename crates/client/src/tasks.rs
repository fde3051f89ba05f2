//! Fire-and-forget background work owned by the worker.
//!
//! Cache writes that happen after a response was already delivered run here.
//! Their outcome is never observed by the request that spawned them;
//! [`BackgroundTasks::settle`] lets tests and shutdown wait for them.

use std::future::Future;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

#[derive(Debug, Default)]
pub struct BackgroundTasks {
    set: Mutex<JoinSet<()>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task onto the current runtime.
    ///
    /// Finished tasks are reaped first so the set does not grow with traffic.
    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut set = self.set.lock().await;
        while let Some(result) = set.try_join_next() {
            if let Err(e) = result {
                tracing::warn!("background task failed: {}", e);
            }
        }
        set.spawn(task);
    }

    /// Number of tasks not yet reaped.
    pub async fn pending(&self) -> usize {
        self.set.lock().await.len()
    }

    /// Wait until every spawned task, including ones spawned meanwhile, has finished.
    ///
    /// Cancel-safe: if this future is dropped, tasks still being waited on are
    /// detached and run to completion.
    pub async fn settle(&self) {
        loop {
            let mut draining = Draining(std::mem::take(&mut *self.set.lock().await));
            if draining.0.is_empty() {
                return;
            }
            while let Some(result) = draining.0.join_next().await {
                if let Err(e) = result {
                    tracing::warn!("background task failed: {}", e);
                }
            }
        }
    }
}

/// Tasks taken out of the set by `settle`; dropping it detaches the rest.
struct Draining(JoinSet<()>);

impl Drop for Draining {
    fn drop(&mut self) {
        self.0.detach_all();
    }
}
