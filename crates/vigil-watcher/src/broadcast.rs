use tokio::sync::mpsc;

use vigil_core::overlay::StatusUpdate;

/// Identifies one subscribed tab.
pub type TabId = u64;

/// Fan-out of status updates to per-tab channels. A tab that has gone
/// away (receiver dropped) is pruned on the next publish; one dead tab
/// never affects delivery to the others.
#[derive(Default)]
pub struct StatusPublisher {
    subscribers: Vec<(TabId, mpsc::UnboundedSender<StatusUpdate>)>,
    next_id: TabId,
}

impl StatusPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tab; returns its id and update stream.
    pub fn subscribe(&mut self) -> (TabId, mpsc::UnboundedReceiver<StatusUpdate>) {
        let id = self.next_id;
        self.next_id += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push((id, tx));
        (id, rx)
    }

    pub fn unsubscribe(&mut self, id: TabId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Deliver the update to every live subscriber.
    pub fn publish(&mut self, update: &StatusUpdate) {
        self.subscribers.retain(|(id, tx)| {
            match tx.send(update.clone()) {
                Ok(()) => true,
                Err(_) => {
                    tracing::debug!(tab = *id, "dropping closed tab subscription");
                    false
                },
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
