//! A single pending teleport request.
//!
//! There is no status field. A request that exists in the
//! [`RequestRegistry`](crate::RequestRegistry) is pending; taking it out of
//! the registry *is* the terminal transition. Whoever takes it owns the
//! outcome, and nobody else can take it again.

use std::fmt;

use wayforge_protocol::ParticipantId;
use wayforge_tick::TimerHandle;

/// Unique identifier for a request, allocated by the registry.
///
/// Two requests created on the same tick still get different ids, which is
/// what lets a late expiry tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// One pending request from `requester` to `target`.
#[derive(Debug, Clone)]
pub struct InteractionRequest {
    id: RequestId,
    requester: ParticipantId,
    target: ParticipantId,
    /// Tick the request was created on.
    created_at: u64,
    /// The one-shot expiry timer owned by this request.
    timer: TimerHandle,
}

impl InteractionRequest {
    pub fn new(
        id: RequestId,
        requester: ParticipantId,
        target: ParticipantId,
        created_at: u64,
        timer: TimerHandle,
    ) -> Self {
        Self {
            id,
            requester,
            target,
            created_at,
            timer,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn requester(&self) -> ParticipantId {
        self.requester
    }

    pub fn target(&self) -> ParticipantId {
        self.target
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn timer(&self) -> TimerHandle {
        self.timer
    }

    /// Whether this is the request an expiry scheduled at creation refers
    /// to. Requester, creation tick, and id must all agree.
    pub fn is_same(&self, requester: ParticipantId, created_at: u64, id: RequestId) -> bool {
        self.requester == requester && self.created_at == created_at && self.id == id
    }
}
