//! Task claiming over REQUEST and DOING messages.
//!
//! Producers announce dropped units with REQUEST. Receivers that cover the
//! reported cell queue it in their backlog and claim it once they are free.
//! A claim is announced to same-tier peers with DOING; when two robots claim
//! the same cell, the one that was further away when it claimed backs off,
//! and on a tie the larger id backs off. Distances are the ones recorded at
//! claim time, carried in the DOING's `sender_pos`, so both sides reach the
//! same verdict no matter when the messages arrive.
//!
//! All functions mutate [`Knowledge`] only. Sending is left to the robot.

use reclaim_types::{ActionOutcome, Message, MessageContent, Performative};

use crate::knowledge::{BacklogEntry, Claim, Knowledge};

/// What processing one message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageEffect {
    /// Already seen; dropped.
    Duplicate,
    /// Not relevant to this robot.
    Ignored,
    /// REQUEST queued in the backlog.
    Queued,
    /// REQUEST queued, evicting the oldest backlog entry.
    QueuedWithEviction(BacklogEntry),
    /// DOING for our claim, and we are closer (or tied with a lower id).
    Held,
    /// DOING for our claim, and the sender wins: claim dropped.
    Ceded(Claim),
    /// DOING for a cell we had only queued: entry removed.
    Withdrawn,
}

/// Process one delivered message.
pub fn receive(knowledge: &mut Knowledge, message: &Message) -> MessageEffect {
    if !knowledge.seen.insert(message.dedupe_key()) {
        return MessageEffect::Duplicate;
    }
    match message.performative {
        Performative::Request => on_request(knowledge, &message.content),
        Performative::Doing => on_doing(knowledge, message),
    }
}

fn on_request(knowledge: &mut Knowledge, content: &MessageContent) -> MessageEffect {
    let pos = content.waste_pos;
    if content.waste_tier != knowledge.policy.collects() || !knowledge.covers(pos) {
        return MessageEffect::Ignored;
    }
    if knowledge.target_claim.is_some_and(|c| c.waste_pos == pos) {
        return MessageEffect::Ignored;
    }
    let entry = BacklogEntry {
        waste_pos: pos,
        tier: content.waste_tier,
        waste_id: content.waste_id,
    };
    match knowledge.waste_locations.insert(entry) {
        Some(evicted) => MessageEffect::QueuedWithEviction(evicted),
        None => MessageEffect::Queued,
    }
}

fn on_doing(knowledge: &mut Knowledge, message: &Message) -> MessageEffect {
    let pos = message.content.waste_pos;
    match knowledge.target_claim {
        Some(claim) if claim.waste_pos == pos => {
            let theirs = message.content.sender_pos.manhattan(pos);
            let yields = claim.distance > theirs
                || (claim.distance == theirs && knowledge.id > message.sender);
            if yields {
                knowledge.target_claim = None;
                knowledge.last_notified = None;
                knowledge.waste_locations.remove(pos);
                MessageEffect::Ceded(claim)
            } else {
                MessageEffect::Held
            }
        }
        _ => {
            if knowledge.waste_locations.remove(pos) {
                MessageEffect::Withdrawn
            } else {
                MessageEffect::Ignored
            }
        }
    }
}

/// Drop a claim whose cell has been reached and holds nothing to collect.
///
/// Returns the stale claim, if one was dropped.
pub fn clear_stale_claim(knowledge: &mut Knowledge) -> Option<Claim> {
    let claim = knowledge.target_claim?;
    if knowledge.position != claim.waste_pos {
        return None;
    }
    let still_there = knowledge.here().is_some_and(|v| knowledge.is_collectable(v));
    if still_there {
        return None;
    }
    knowledge.target_claim = None;
    knowledge.last_notified = None;
    Some(claim)
}

/// Forget backlog entries for cells now in view that no longer hold waste
/// of the reported tier. Returns how many were dropped.
pub fn prune_backlog(knowledge: &mut Knowledge) -> usize {
    let before = knowledge.waste_locations.len();
    let percepts = &knowledge.percepts;
    knowledge.waste_locations.retain(|entry| {
        percepts
            .iter()
            .find(|v| v.position == entry.waste_pos)
            .is_none_or(|v| v.has_waste_of(entry.tier))
    });
    before.saturating_sub(knowledge.waste_locations.len())
}

/// Claim the nearest backlog entry if the robot is free and has no claim.
pub fn select_claim(knowledge: &mut Knowledge) -> Option<Claim> {
    if knowledge.target_claim.is_some() || !knowledge.is_free() {
        return None;
    }
    let entry = knowledge.waste_locations.take_nearest(knowledge.position)?;
    let claim = Claim::from_entry(entry, knowledge.position);
    knowledge.target_claim = Some(claim);
    Some(claim)
}

/// The DOING payload for the current claim, unless it was already announced.
pub fn announcement(knowledge: &mut Knowledge) -> Option<MessageContent> {
    let claim = knowledge.target_claim?;
    if knowledge.last_notified == Some(claim.waste_pos) {
        return None;
    }
    knowledge.last_notified = Some(claim.waste_pos);
    Some(MessageContent {
        waste_pos: claim.waste_pos,
        waste_tier: claim.tier,
        waste_id: claim.waste_id,
        sender_pos: claim.origin,
    })
}

/// Claim and latch bookkeeping once the arbitrator has answered.
///
/// Expects position and inventory already synced from the body.
pub fn after_action(knowledge: &mut Knowledge, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Dropped { .. } | ActionOutcome::Disposed { .. } => {
            knowledge.target_claim = None;
            knowledge.last_notified = None;
            knowledge.has_transformed = false;
        }
        ActionOutcome::Transformed { .. } => {
            knowledge.has_transformed = true;
        }
        ActionOutcome::PickedUp { .. } => {
            knowledge.waste_locations.remove(knowledge.position);
            let Some(claim) = knowledge.target_claim else {
                return;
            };
            if claim.waste_pos == knowledge.position {
                knowledge.target_claim = None;
                knowledge.last_notified = None;
            } else if !knowledge.is_free() {
                knowledge.waste_locations.insert(claim.as_entry());
                knowledge.target_claim = None;
                knowledge.last_notified = None;
            }
        }
        ActionOutcome::Moved { .. } | ActionOutcome::NoEffect { .. } => {}
    }
}
