use chainsim_common::{
    api::daemon::NewBlockEvent,
    tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
};
use log::{debug, trace};
use std::collections::HashMap;

pub type SubscriptionId = u64;

// Handle returned to a subscriber
// Events are received in append order, dropping the receiver ends the subscription
pub struct Subscription {
    pub id: SubscriptionId,
    pub receiver: UnboundedReceiver<NewBlockEvent>,
}

// Fan-out of block append notifications
// Sending never blocks: every subscriber owns an unbounded queue
#[derive(Default)]
pub struct EventNotifier {
    next_id: SubscriptionId,
    subscribers: HashMap<SubscriptionId, UnboundedSender<NewBlockEvent>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (sender, receiver) = unbounded_channel();
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, sender);
        debug!("new subscriber #{}", id);
        Subscription { id, receiver }
    }

    // Returns false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            debug!("subscriber #{} removed", id);
        }
        removed
    }

    // Deliver the event to every subscriber, closed ones are pruned
    pub fn notify(&mut self, event: &NewBlockEvent) {
        self.subscribers.retain(|id, sender| {
            if sender.send(event.clone()).is_err() {
                trace!("subscriber #{} is closed, pruning it", id);
                return false;
            }
            true
        });
        debug!(
            "block {} notified to {} subscribers",
            event.number,
            self.count_subscribers()
        );
    }

    pub fn count_subscribers(&self) -> usize {
        self.subscribers.len()
    }
}
