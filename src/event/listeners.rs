//! Host-side listener registry.
//!
//! Hosts observe a widget by subscribing; each subscription is an unbounded
//! channel receiver. Dropping the receiver is enough to stop listening: the
//! closed sender is pruned on the next emit.

use slotmap::{new_key_type, SlotMap};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::message::Envelope;

new_key_type! {
    /// Handle returned by [`Listeners::subscribe`].
    pub struct ListenerId;
}

/// Registry of host subscriptions.
#[derive(Debug, Default)]
pub struct Listeners {
    senders: SlotMap<ListenerId, UnboundedSender<Envelope>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener.
    pub fn subscribe(&mut self) -> (ListenerId, UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.senders.insert(tx), rx)
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.senders.remove(id).is_some()
    }

    /// Deliver `envelope` to every live listener. Returns how many got it.
    pub fn emit(&mut self, envelope: &Envelope) -> usize {
        self.senders
            .retain(|_, tx| tx.send(envelope.clone()).is_ok());
        self.senders.len()
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn clear(&mut self) {
        self.senders.clear();
    }
}
