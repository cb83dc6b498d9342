// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Where callback-style completions run.

use tokio::sync::mpsc;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// The context on which the callback adapters of [`CacheStore`](crate::CacheStore)
/// invoke their callbacks.
///
/// [`Delivery::immediate`] runs a callback on whichever runtime worker finished
/// the operation. [`Delivery::queue`] instead posts it to a [`DeliveryQueue`]
/// that its owner drains, typically from a UI loop that must not be touched
/// from other threads.
///
/// # Examples
///
/// ```
/// use stow::Delivery;
///
/// let (delivery, mut queue) = Delivery::queue();
/// # let _ = delivery;
/// // ... hand `delivery` to the store builder, then on the owning loop:
/// let ran = queue.run_pending();
/// assert_eq!(ran, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Delivery {
    target: Target,
}

#[derive(Debug, Clone, Default)]
enum Target {
    #[default]
    Immediate,
    Queue(mpsc::UnboundedSender<Callback>),
}

impl Delivery {
    /// Runs callbacks inline, where the operation completed.
    #[must_use]
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Posts callbacks to the returned [`DeliveryQueue`].
    #[must_use]
    pub fn queue() -> (Self, DeliveryQueue) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                target: Target::Queue(sender),
            },
            DeliveryQueue { receiver },
        )
    }

    pub(crate) fn dispatch(&self, callback: impl FnOnce() + Send + 'static) {
        match &self.target {
            Target::Immediate => callback(),
            Target::Queue(sender) => {
                if sender.send(Box::new(callback)).is_err() {
                    tracing::debug!("delivery queue is gone, callback discarded");
                }
            }
        }
    }
}

/// Receiving end of [`Delivery::queue`].
#[derive(Debug)]
pub struct DeliveryQueue {
    receiver: mpsc::UnboundedReceiver<Callback>,
}

impl DeliveryQueue {
    /// Runs every callback posted so far without waiting, returning how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(callback) = self.receiver.try_recv() {
            callback();
            ran += 1;
        }
        ran
    }

    /// Waits for the next callback and runs it.
    ///
    /// Returns `false` once every [`Delivery`] feeding this queue is dropped and
    /// nothing is left to run.
    pub async fn run_next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}
