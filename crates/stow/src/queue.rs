// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-instance work queue with concurrent and exclusive (barrier) tasks.
//!
//! A dispatcher task on the configured runtime receives tasks in submission
//! order. Concurrent tasks start right away on the blocking pool. An exclusive
//! task first waits for every task that is still running, then runs alone;
//! nothing submitted after it starts before it finishes.
//!
//! Jobs run inside the span that was current when they were submitted.

use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot},
    task::JoinSet,
};

use crate::StoreError;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Task {
    Concurrent(Job),
    Exclusive(Job),
}

/// Handle to the queue. The dispatcher stops once every handle is dropped and
/// the work submitted before that has finished.
#[derive(Debug, Clone)]
pub(crate) struct WorkQueue {
    sender: mpsc::UnboundedSender<Task>,
    namespace: Arc<str>,
}

impl WorkQueue {
    pub(crate) fn start(runtime: &Handle, namespace: Arc<str>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        runtime.spawn(dispatch(receiver, Arc::clone(&namespace)));
        Self { sender, namespace }
    }

    /// Schedules `work` to run alongside other concurrent tasks.
    pub(crate) fn concurrent<T, F>(&self, work: F) -> BoxFuture<'static, Result<T, StoreError>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit(work, Task::Concurrent)
    }

    /// Schedules `work` to run alone, after everything submitted before it.
    pub(crate) fn exclusive<T, F>(&self, work: F) -> BoxFuture<'static, Result<T, StoreError>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit(work, Task::Exclusive)
    }

    fn submit<T, F>(&self, work: F, lane: fn(Job) -> Task) -> BoxFuture<'static, Result<T, StoreError>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let span = tracing::Span::current();
        let job: Job = Box::new(move || {
            // The caller may have dropped its completion.
            let _ = tx.send(span.in_scope(work));
        });

        // A rejected task is dropped together with `tx`, which resolves `rx` below.
        let _ = self.sender.send(lane(job));

        let namespace = Arc::clone(&self.namespace);
        async move {
            rx.await.map_err(|_| StoreError::Closed {
                namespace: namespace.to_string(),
            })
        }
        .boxed()
    }
}

async fn dispatch(mut receiver: mpsc::UnboundedReceiver<Task>, namespace: Arc<str>) {
    let mut running = JoinSet::new();

    while let Some(task) = receiver.recv().await {
        while let Some(finished) = running.try_join_next() {
            report(&namespace, finished);
        }

        match task {
            Task::Concurrent(job) => {
                running.spawn_blocking(job);
            }
            Task::Exclusive(job) => {
                while let Some(finished) = running.join_next().await {
                    report(&namespace, finished);
                }
                report(&namespace, tokio::task::spawn_blocking(job).await);
            }
        }
    }

    while let Some(finished) = running.join_next().await {
        report(&namespace, finished);
    }
    tracing::trace!(cache.namespace = %namespace, "work queue stopped");
}

fn report(namespace: &str, finished: Result<(), tokio::task::JoinError>) {
    if let Err(e) = finished {
        tracing::error!(cache.namespace = %namespace, error = %e, "work queue task failed");
    }
}
