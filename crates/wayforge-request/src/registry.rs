//! The request registry: at most one pending request per target.
//!
//! # Concurrency note
//!
//! Plain `HashMap`, no locking. Owned by the
//! [`RequestManager`](crate::RequestManager), which runs on the engine
//! actor's single task, so the reverse scan in
//! [`latest_from`](RequestRegistry::latest_from) can never observe a
//! half-applied mutation.

use std::collections::HashMap;

use wayforge_protocol::ParticipantId;

use crate::{InteractionRequest, RequestError, RequestId};

/// Pending requests keyed by target.
#[derive(Debug)]
pub struct RequestRegistry {
    pending: HashMap<ParticipantId, InteractionRequest>,
    next_id: u64,
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            next_id: 1,
        }
    }
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next request id.
    pub fn allocate_id(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn get(&self, target: &ParticipantId) -> Option<&InteractionRequest> {
        self.pending.get(target)
    }

    pub fn contains(&self, target: &ParticipantId) -> bool {
        self.pending.contains_key(target)
    }

    /// Adds a request for a target that has none.
    ///
    /// # Errors
    /// [`RequestError::AlreadyPending`] if the target already has one.
    pub fn insert(&mut self, request: InteractionRequest) -> Result<(), RequestError> {
        let target = request.target();
        if self.pending.contains_key(&target) {
            return Err(RequestError::AlreadyPending(target));
        }
        self.pending.insert(target, request);
        Ok(())
    }

    /// Stores `request`, returning whatever it replaced.
    ///
    /// This is the send path: a newer request to the same target replaces
    /// the older one. The caller resolves the returned request.
    pub fn supersede(&mut self, request: InteractionRequest) -> Option<InteractionRequest> {
        self.pending.insert(request.target(), request)
    }

    /// Removes and returns the target's pending request.
    pub fn take(&mut self, target: &ParticipantId) -> Option<InteractionRequest> {
        self.pending.remove(target)
    }

    /// Removes the target's request only if it is the one identified by
    /// `requester`, `created_at`, and `id`. Anything else stays put.
    pub fn take_matching(
        &mut self,
        target: &ParticipantId,
        requester: ParticipantId,
        created_at: u64,
        id: RequestId,
    ) -> Option<InteractionRequest> {
        let matches = self
            .pending
            .get(target)
            .is_some_and(|r| r.is_same(requester, created_at, id));
        if matches { self.pending.remove(target) } else { None }
    }

    /// Target of the most recent request sent by `requester`.
    pub fn latest_from(&self, requester: ParticipantId) -> Option<ParticipantId> {
        self.pending
            .values()
            .filter(|r| r.requester() == requester)
            .max_by_key(|r| r.id())
            .map(InteractionRequest::target)
    }

    /// Targets of every request sent by `requester`, oldest first.
    pub fn targets_of(&self, requester: ParticipantId) -> Vec<ParticipantId> {
        let mut outgoing: Vec<_> = self
            .pending
            .values()
            .filter(|r| r.requester() == requester)
            .collect();
        outgoing.sort_by_key(|r| r.id());
        outgoing.into_iter().map(InteractionRequest::target).collect()
    }

    /// Removes and returns every pending request.
    pub fn drain(&mut self) -> Vec<InteractionRequest> {
        self.pending.drain().map(|(_, r)| r).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
