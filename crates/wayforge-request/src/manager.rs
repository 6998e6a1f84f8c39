//! The request manager: sends, resolves, and expires teleport requests.
//!
//! # Exactly one outcome
//!
//! Every resolution path (accept, deny, cancel, expiry, disconnect,
//! supersede) starts by *taking* the request out of the registry. Only the
//! path that gets it back runs its outcome; everyone else sees "no pending
//! request". Because all paths run on the engine actor's single loop, there
//! is no window where two of them both hold the same request.
//!
//! # Stale expiries
//!
//! The expiry timer is cancelled whenever a request is resolved early, but
//! the expiry event also carries the request's requester, creation tick,
//! and id. If the entry in the registry no longer matches, the event is
//! dropped. A superseded request's expiry can never remove its successor.

use std::sync::Arc;

use tracing::{debug, info, warn};
use wayforge_protocol::{Notice, Notifier, ParticipantId, WorldOracle};
use wayforge_tick::Timers;

use crate::{
    InteractionRequest, Ledger, RequestConfig, RequestError, RequestId, RequestPreferences,
    RequestRegistry,
};

/// The host services a [`RequestManager`] calls out to.
#[derive(Clone)]
pub struct RequestServices {
    pub world: Arc<dyn WorldOracle>,
    pub notifier: Arc<dyn Notifier>,
    /// `None` makes every request free.
    pub ledger: Option<Arc<dyn Ledger>>,
    pub preferences: Arc<dyn RequestPreferences>,
}

/// Outcome of a successful accept.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub requester: ParticipantId,
    /// What the requester paid, if anything.
    pub cost: Option<f64>,
}

/// The event an expiry timer delivers.
#[derive(Debug, Clone, Copy)]
struct Expiry {
    target: ParticipantId,
    requester: ParticipantId,
    created_at: u64,
    id: RequestId,
}

/// Runs every pending teleport request.
pub struct RequestManager {
    config: RequestConfig,
    ticks_per_second: u64,
    registry: RequestRegistry,
    timers: Timers<Expiry>,
    services: RequestServices,
}

impl RequestManager {
    pub fn new(config: RequestConfig, ticks_per_second: u32, services: RequestServices) -> Self {
        Self {
            config: config.validated(),
            ticks_per_second: u64::from(ticks_per_second.max(1)),
            registry: RequestRegistry::new(),
            timers: Timers::new(),
            services,
        }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Read access to the pending requests.
    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    /// The request currently waiting on `target`, if any.
    pub fn pending_for(&self, target: ParticipantId) -> Option<&InteractionRequest> {
        self.registry.get(&target)
    }

    // =====================================================================
    // Entry points
    // =====================================================================

    /// Sends a request from `requester` to `target`.
    ///
    /// Affordability is checked here but nothing is charged until the
    /// target accepts. A newer request to the same target replaces the
    /// older one; the displaced requester (if someone else) is told. Both
    /// the target and the requester get a notice with the timeout.
    ///
    /// # Errors
    /// - [`RequestError::SelfRequest`]
    /// - [`RequestError::TargetOffline`]
    /// - [`RequestError::TargetDisabled`]: the target switched requests off
    /// - [`RequestError::InsufficientBalance`]: the requester can't pay
    pub fn send(
        &mut self,
        requester: ParticipantId,
        target: ParticipantId,
    ) -> Result<RequestId, RequestError> {
        if requester == target {
            return Err(RequestError::SelfRequest);
        }
        if !self.services.world.is_online(target) {
            return Err(RequestError::TargetOffline(target));
        }
        if !self.services.preferences.accepts_requests(target) {
            return Err(RequestError::TargetDisabled(target));
        }
        if let Some((ledger, cost)) = self.charge_plan() {
            let balance = ledger.balance(requester);
            if balance < cost {
                return Err(RequestError::InsufficientBalance { cost, balance });
            }
        }

        let id = self.registry.allocate_id();
        let created_at = self.timers.now();
        let delay = u64::from(self.config.timeout_secs) * self.ticks_per_second;
        let timer = self.timers.run_after(
            delay,
            Expiry {
                target,
                requester,
                created_at,
                id,
            },
        );
        let request = InteractionRequest::new(id, requester, target, created_at, timer);

        if let Some(old) = self.registry.supersede(request) {
            self.timers.cancel(old.timer());
            info!(%target, old = %old.id(), new = %id, "pending request superseded");
            if old.requester() != requester {
                self.services
                    .notifier
                    .notify(old.requester(), Notice::RequestSuperseded { target });
            }
        }

        let timeout_secs = self.config.timeout_secs;
        self.services.notifier.notify(
            target,
            Notice::RequestReceived {
                requester,
                timeout_secs,
            },
        );
        self.services.notifier.notify(
            requester,
            Notice::RequestSent {
                target,
                timeout_secs,
            },
        );
        info!(%requester, %target, %id, "request sent");
        Ok(id)
    }

    /// Accepts the request waiting on `target`.
    ///
    /// The request is consumed as soon as it is found, whatever happens
    /// next. Affordability is checked again and the requester charged
    /// before the teleport; a charge is never retried and never refunded.
    ///
    /// # Errors
    /// - [`RequestError::NoPendingRequest`]: nothing pending (or it expired)
    /// - [`RequestError::RequesterOffline`]: the target is notified
    /// - [`RequestError::TargetOffline`]
    /// - [`RequestError::InsufficientBalance`]: both sides are notified
    /// - [`RequestError::ChargeFailed`]: both sides are notified
    /// - [`RequestError::TeleportFailed`]: the charge stands
    pub fn accept(&mut self, target: ParticipantId) -> Result<Accepted, RequestError> {
        let request = self.take(target)?;
        let requester = request.requester();

        if !self.services.world.is_online(requester) {
            self.services
                .notifier
                .notify(target, Notice::RequesterOffline { requester });
            info!(%requester, %target, "accept failed: requester offline");
            return Err(RequestError::RequesterOffline(requester));
        }
        let destination = self
            .services
            .world
            .location(target)
            .ok_or(RequestError::TargetOffline(target))?;

        let mut charged = None;
        if let Some((ledger, cost)) = self.charge_plan() {
            let balance = ledger.balance(requester);
            if balance < cost {
                self.services
                    .notifier
                    .notify(requester, Notice::InsufficientBalance { cost, balance });
                self.services
                    .notifier
                    .notify(target, Notice::RequesterCannotPay { requester });
                info!(%requester, %target, cost, balance, "accept failed: requester cannot pay");
                return Err(RequestError::InsufficientBalance { cost, balance });
            }
            if let Err(e) = ledger.withdraw(requester, cost) {
                self.services
                    .notifier
                    .notify(requester, Notice::ChargeFailed { counterpart: target });
                self.services
                    .notifier
                    .notify(target, Notice::ChargeFailed { counterpart: requester });
                warn!(%requester, %target, cost, error = %e, "request charge failed");
                return Err(RequestError::ChargeFailed(e));
            }
            charged = Some(cost);
        }

        if let Err(e) = self.services.world.teleport(requester, &destination) {
            warn!(%requester, %target, ?charged, error = %e, "teleport failed after charge");
            return Err(RequestError::TeleportFailed(e));
        }

        self.services.notifier.notify(
            requester,
            Notice::Teleported {
                target,
                cost: charged,
            },
        );
        self.services
            .notifier
            .notify(target, Notice::RequestAccepted { requester });
        info!(%requester, %target, id = %request.id(), "request accepted");

        Ok(Accepted {
            requester,
            cost: charged,
        })
    }

    /// Denies the request waiting on `target`. Returns the requester.
    pub fn deny(&mut self, target: ParticipantId) -> Result<ParticipantId, RequestError> {
        let request = self.take(target)?;
        let requester = request.requester();
        if self.services.world.is_online(requester) {
            self.services
                .notifier
                .notify(requester, Notice::RequestDenied { target });
        }
        info!(%requester, %target, id = %request.id(), "request denied");
        Ok(requester)
    }

    /// Withdraws `requester`'s most recent outgoing request. Returns its
    /// target. Requests from anyone else are left alone.
    pub fn cancel(&mut self, requester: ParticipantId) -> Result<ParticipantId, RequestError> {
        let target = self
            .registry
            .latest_from(requester)
            .ok_or(RequestError::NoOutgoingRequest(requester))?;
        let request = self.take(target)?;
        if self.services.world.is_online(target) {
            self.services
                .notifier
                .notify(target, Notice::RequestCancelled { requester });
        }
        info!(%requester, %target, id = %request.id(), "request cancelled");
        Ok(target)
    }

    /// Drops every request `participant` sent or received, telling each
    /// counterpart. Safe to call at any time. Returns how many went.
    pub fn disconnect(&mut self, participant: ParticipantId) -> usize {
        let mut removed = 0;

        if let Some(incoming) = self.registry.take(&participant) {
            self.timers.cancel(incoming.timer());
            self.services.notifier.notify(
                incoming.requester(),
                Notice::RequestWithdrawn { by: participant },
            );
            removed += 1;
        }

        for target in self.registry.targets_of(participant) {
            if let Some(outgoing) = self.registry.take(&target) {
                self.timers.cancel(outgoing.timer());
                self.services
                    .notifier
                    .notify(target, Notice::RequestWithdrawn { by: participant });
                removed += 1;
            }
        }

        if removed > 0 {
            info!(%participant, removed, "requests withdrawn on disconnect");
        }
        removed
    }

    /// Flips `participant`'s "accept requests" switch. Returns the new value.
    pub fn toggle_requests(&mut self, participant: ParticipantId) -> bool {
        let accepts = !self.services.preferences.accepts_requests(participant);
        self.set_requests(participant, accepts);
        accepts
    }

    pub fn set_requests(&mut self, participant: ParticipantId, accepts: bool) {
        self.services
            .preferences
            .set_accepts_requests(participant, accepts);
        debug!(%participant, accepts, "request preference changed");
    }

    pub fn accepts_requests(&self, participant: ParticipantId) -> bool {
        self.services.preferences.accepts_requests(participant)
    }

    /// Drops every pending request without notifying anyone.
    pub fn shutdown(&mut self) -> usize {
        let pending = self.registry.drain();
        for request in &pending {
            self.timers.cancel(request.timer());
        }
        pending.len()
    }

    /// Advances expiry timers by one engine tick.
    pub fn on_tick(&mut self) {
        for (handle, expiry) in self.timers.advance() {
            let Some(request) = self.registry.take_matching(
                &expiry.target,
                expiry.requester,
                expiry.created_at,
                expiry.id,
            ) else {
                let Expiry { target, id, .. } = expiry;
                debug!(%target, %handle, %id, "stale expiry ignored");
                continue;
            };
            let (requester, target) = (request.requester(), request.target());
            self.services
                .notifier
                .notify(requester, Notice::RequestExpired { target });
            info!(%requester, %target, id = %request.id(), "request expired");
        }
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// The single terminal step: remove the request and stop its timer.
    fn take(&mut self, target: ParticipantId) -> Result<InteractionRequest, RequestError> {
        let request = self
            .registry
            .take(&target)
            .ok_or(RequestError::NoPendingRequest(target))?;
        self.timers.cancel(request.timer());
        Ok(request)
    }

    /// The ledger and amount to charge, when charging applies.
    fn charge_plan(&self) -> Option<(Arc<dyn Ledger>, f64)> {
        let cost = self.config.charge()?;
        match &self.services.ledger {
            Some(ledger) => Some((Arc::clone(ledger), cost)),
            None => {
                debug!(cost, "request cost configured but no ledger installed");
                None
            }
        }
    }
}
