//! Change notification fan-out
//!
//! Publishers hold a [`Subscribers`] list; each subscriber gets its own
//! `mpsc` receiver. Events are cloned per subscriber, delivered in publish
//! order, and subscribers whose receiver was dropped are pruned on the next
//! publish.

use std::sync::mpsc::{channel, Receiver, Sender};

pub struct Subscribers<T> {
    senders: Vec<Sender<T>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.senders.len())
            .finish()
    }
}

impl<T: Clone> Subscribers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver an event to every live subscriber
    pub fn publish(&mut self, event: T) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of subscribers still registered
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
