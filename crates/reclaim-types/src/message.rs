//! Inter-robot messages.
//!
//! Messages are plain data. Delivery goes through the mailbox owned by the
//! core crate, which holds each message for one tick before handing it over.

use serde::{Deserialize, Serialize};

use crate::enums::{Performative, Tier};
use crate::geometry::Position;
use crate::ids::{AgentId, WasteId};

/// Payload shared by every performative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageContent {
    /// Where the waste lies.
    pub waste_pos: Position,
    /// Tier of the waste.
    pub waste_tier: Tier,
    /// Identity of the waste, when the sender knew it.
    pub waste_id: Option<WasteId>,
    /// For `REQUEST`, where the sender stood when it dropped the waste.
    /// For `DOING`, where the sender stood when it claimed the waste.
    pub sender_pos: Position,
}

/// A message from one robot to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Sending robot.
    pub sender: AgentId,
    /// Receiving robot.
    pub recipient: AgentId,
    /// Intent.
    pub performative: Performative,
    /// Payload.
    pub content: MessageContent,
    /// Tick at which the message was posted.
    pub sent_tick: u64,
}

impl Message {
    /// Build a `REQUEST` announcing dropped waste.
    pub const fn request(
        sender: AgentId,
        recipient: AgentId,
        content: MessageContent,
        sent_tick: u64,
    ) -> Self {
        Self {
            sender,
            recipient,
            performative: Performative::Request,
            content,
            sent_tick,
        }
    }

    /// Build a `DOING` announcing a claim.
    pub const fn doing(
        sender: AgentId,
        recipient: AgentId,
        content: MessageContent,
        sent_tick: u64,
    ) -> Self {
        Self {
            sender,
            recipient,
            performative: Performative::Doing,
            content,
            sent_tick,
        }
    }

    /// Key used to suppress duplicate deliveries.
    pub const fn dedupe_key(&self) -> (AgentId, Performative, Position, Option<WasteId>) {
        (
            self.sender,
            self.performative,
            self.content.waste_pos,
            self.content.waste_id,
        )
    }
}
