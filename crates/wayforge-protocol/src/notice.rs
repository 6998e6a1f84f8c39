//! Notices: what the engine tells participants.
//!
//! The engine never renders text. It emits a [`Notice`] through the
//! [`Notifier`](crate::Notifier) port, and the host's message layer turns it
//! into localized chat using [`Notice::key`] plus the variant's fields as
//! placeholders.

use serde::{Deserialize, Serialize};

use crate::{BlockPos, ParticipantId};

/// A participant-facing event emitted by the session or request workflow.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "TimeWarning", "remaining_secs": 30 }`, which is what the host
/// bridge consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    // -- Timed game --
    /// The game has started; the participant was moved to the start point.
    GameStarted {
        time_limit_secs: u32,
        target: BlockPos,
        radius: f64,
    },

    /// A configured countdown threshold was crossed.
    TimeWarning { remaining_secs: u32 },

    /// The participant reached the target in time. Rewards were dispatched.
    GameWon,

    /// Time ran out before the target was reached.
    GameTimedOut,

    /// The game was ended on request (participant or administrator).
    GameEnded,

    // -- Teleport requests --
    /// Sent to the requester: the request is on its way and waits this long.
    RequestSent {
        target: ParticipantId,
        timeout_secs: u32,
    },

    /// Sent to the target: someone wants to teleport to you.
    RequestReceived {
        requester: ParticipantId,
        timeout_secs: u32,
    },

    /// Sent to a requester whose pending request was replaced by a newer
    /// request from someone else to the same target.
    RequestSuperseded { target: ParticipantId },

    /// Sent to the requester when nobody answered in time.
    RequestExpired { target: ParticipantId },

    /// Sent to the requester when the target said no.
    RequestDenied { target: ParticipantId },

    /// Sent to the target when the requester cancelled.
    RequestCancelled { requester: ParticipantId },

    /// Sent to the counterpart when the other side left the server.
    RequestWithdrawn { by: ParticipantId },

    /// Sent to the requester when their balance does not cover the cost.
    InsufficientBalance { cost: f64, balance: f64 },

    /// Sent to the target when the requester had already left on accept.
    RequesterOffline { requester: ParticipantId },

    /// Sent to the target when the requester could not pay on accept.
    RequesterCannotPay { requester: ParticipantId },

    /// The ledger refused or failed the withdrawal.
    ChargeFailed { counterpart: ParticipantId },

    /// Sent to the requester after a successful teleport.
    Teleported {
        target: ParticipantId,
        cost: Option<f64>,
    },

    /// Sent to the target after the requester arrived.
    RequestAccepted { requester: ParticipantId },
}

impl Notice {
    /// The message-catalogue key the host uses to localize this notice.
    pub fn key(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => "game.started",
            Self::TimeWarning { .. } => "game.time_warning",
            Self::GameWon => "game.success",
            Self::GameTimedOut => "game.timeout",
            Self::GameEnded => "game.ended_manual",
            Self::RequestSent { .. } => "request.sent",
            Self::RequestReceived { .. } => "request.received",
            Self::RequestSuperseded { .. } => "request.superseded",
            Self::RequestExpired { .. } => "request.expired",
            Self::RequestDenied { .. } => "request.denied",
            Self::RequestCancelled { .. } => "request.cancelled",
            Self::RequestWithdrawn { .. } => "request.withdrawn",
            Self::RequesterOffline { .. } => "request.requester_offline",
            Self::InsufficientBalance { .. } => "request.insufficient_balance",
            Self::RequesterCannotPay { .. } => "request.requester_no_money",
            Self::ChargeFailed { .. } => "request.cost_failure",
            Self::Teleported { .. } => "request.success",
            Self::RequestAccepted { .. } => "request.accepted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_is_internally_tagged() {
        let json = serde_json::to_value(Notice::TimeWarning { remaining_secs: 30 }).unwrap();
        assert_eq!(json["type"], "TimeWarning");
        assert_eq!(json["remaining_secs"], 30);
    }

    #[test]
    fn test_unit_notice_serializes_with_tag_only() {
        let json = serde_json::to_value(Notice::GameWon).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "GameWon" }));
    }

    #[test]
    fn test_notice_keys_are_namespaced_by_workflow() {
        assert_eq!(Notice::GameTimedOut.key(), "game.timeout");
        assert_eq!(
            Notice::RequestExpired { target: ParticipantId(2) }.key(),
            "request.expired"
        );
        assert!(
            Notice::Teleported { target: ParticipantId(2), cost: None }
                .key()
                .starts_with("request.")
        );
    }
}
