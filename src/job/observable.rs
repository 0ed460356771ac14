//! Observable values published by the job controller
//!
//! Holds the latest value for polling readers and fans every publication out
//! to subscribers in publication order.
//!
//! An unbounded subscription buffers every publication until it is received,
//! so a receiver that is kept alive but never drained grows without limit.
//! Consumers that only care about recent values should use
//! [`Observable::subscribe_bounded`], which skips publications while its
//! buffer is full.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;

struct Inner<T> {
    value: T,
    subscribers: Vec<Sender<T>>,
}

/// A value with a current state and a stream of updates
pub struct Observable<T: Clone> {
    inner: RwLock<Inner<T>>,
}

impl<T: Clone> Observable<T> {
    /// Create an observable holding `initial`
    pub fn new(initial: T) -> Self {
        Self {
            inner: RwLock::new(Inner {
                value: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.inner.read().value.clone()
    }

    /// Replace the current value and notify subscribers.
    ///
    /// Subscribers whose receiver was dropped are forgotten. A bounded
    /// subscriber with a full buffer misses this publication but stays
    /// subscribed.
    pub fn publish(&self, value: T) {
        let mut inner = self.inner.write();
        inner
            .subscribers
            .retain(|tx| match tx.try_send(value.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => false,
            });
        inner.value = value;
    }

    /// Subscribe to updates. The current value is delivered first.
    pub fn subscribe(&self) -> Receiver<T> {
        self.attach(unbounded())
    }

    /// Subscribe with a buffer of at most `capacity` undelivered values.
    ///
    /// The current value is delivered first. Publications arriving while the
    /// buffer is full are skipped for this subscriber; [`Observable::get`]
    /// always returns the latest value.
    pub fn subscribe_bounded(&self, capacity: usize) -> Receiver<T> {
        self.attach(bounded(capacity.max(1)))
    }

    fn attach(&self, (tx, rx): (Sender<T>, Receiver<T>)) -> Receiver<T> {
        let mut inner = self.inner.write();
        // Fresh channel with room for one value and a live receiver
        let _ = tx.try_send(inner.value.clone());
        inner.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().subscribers.len()
    }
}
