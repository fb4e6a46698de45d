//! Message delivery with one tick of latency.
//!
//! Robots post messages while acting. Posted messages sit in the outbox
//! until [`PostOffice::deliver`] runs at the start of the next tick, so a
//! message is never read in the tick it was sent, whatever the turn order.

use std::collections::BTreeMap;

use reclaim_types::{AgentId, Message};
use tracing::warn;

/// Per-robot inboxes plus the outbox of messages awaiting delivery.
#[derive(Debug, Clone, Default)]
pub struct PostOffice {
    outbox: Vec<Message>,
    inboxes: BTreeMap<AgentId, Vec<Message>>,
    delivered: u64,
}

impl PostOffice {
    /// Create an empty post office.
    pub const fn new() -> Self {
        Self {
            outbox: Vec::new(),
            inboxes: BTreeMap::new(),
            delivered: 0,
        }
    }

    /// Queue a message for the next delivery round.
    pub fn send(&mut self, message: Message) {
        self.outbox.push(message);
    }

    /// Move every queued message sent before `tick` into its recipient's
    /// inbox. Returns how many were delivered.
    pub fn deliver(&mut self, tick: u64) -> usize {
        let (ready, held): (Vec<Message>, Vec<Message>) =
            self.outbox.drain(..).partition(|m| m.sent_tick < tick);
        self.outbox = held;
        let count = ready.len();
        for message in ready {
            self.inboxes.entry(message.recipient).or_default().push(message);
        }
        self.delivered = self
            .delivered
            .saturating_add(u64::try_from(count).unwrap_or(u64::MAX));
        count
    }

    /// Take everything delivered to `agent`, in sending order.
    pub fn collect(&mut self, agent: AgentId) -> Vec<Message> {
        self.inboxes.remove(&agent).unwrap_or_default()
    }

    /// Drop inbox contents nobody collected. Returns how many were lost.
    pub fn discard_uncollected(&mut self, tick: u64) -> usize {
        let lost: usize = self.inboxes.values().map(Vec::len).sum();
        if lost > 0 {
            warn!(tick, lost, "Discarded uncollected messages");
        }
        self.inboxes.clear();
        lost
    }

    /// Messages delivered since the start of the run.
    pub const fn delivered_total(&self) -> u64 {
        self.delivered
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use reclaim_types::{MessageContent, Position, Tier};

    use super::*;

    fn message(from: u64, to: u64, tick: u64) -> Message {
        Message::request(
            AgentId::new(from),
            AgentId::new(to),
            MessageContent {
                waste_pos: Position::new(4, 1),
                waste_tier: Tier::Yellow,
                waste_id: None,
                sender_pos: Position::new(4, 1),
            },
            tick,
        )
    }

    #[test]
    fn nothing_is_delivered_in_the_sending_tick() {
        let mut post = PostOffice::new();
        post.send(message(1, 2, 5));
        assert_eq!(post.deliver(5), 0);
        assert!(post.collect(AgentId::new(2)).is_empty());
        assert_eq!(post.delivered_total(), 0);

        assert_eq!(post.deliver(6), 1);
        let inbox = post.collect(AgentId::new(2));
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].sender, AgentId::new(1));
        assert!(post.collect(AgentId::new(2)).is_empty());
    }

    #[test]
    fn inbox_preserves_sending_order() {
        let mut post = PostOffice::new();
        post.send(message(3, 2, 1));
        post.send(message(1, 2, 1));
        post.deliver(2);
        let senders: Vec<u64> = post
            .collect(AgentId::new(2))
            .iter()
            .map(|m| m.sender.into_inner())
            .collect();
        assert_eq!(senders, vec![3, 1]);
        assert_eq!(post.delivered_total(), 2);
    }

    #[test]
    fn uncollected_mail_is_discarded() {
        let mut post = PostOffice::new();
        post.send(message(1, 9, 1));
        post.deliver(2);
        assert_eq!(post.discard_uncollected(2), 1);
        assert!(post.collect(AgentId::new(9)).is_empty());
    }
}
