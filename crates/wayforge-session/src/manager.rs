//! The game manager: runs every timed game on the server.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Starting games (placement, capability revocation, teleport, timer)
//! - Driving the once-per-second countdown from engine ticks
//! - Ending games exactly once, whatever triggered the end
//! - Cleaning up after a game (timer, capabilities, registry, marker)
//!
//! # The one terminal path
//!
//! Success, timeout, manual end, disconnect, and shutdown all funnel into
//! [`GameManager::finish`]. It asks the session for its [`Teardown`] via
//! [`GameSession::conclude`], which answers only once, so cleanup can't run
//! twice even when two triggers land on the same tick.
//!
//! # Concurrency note
//!
//! Everything here takes `&mut self` and is called from the engine actor's
//! single loop. Timer "callbacks" are events returned by
//! [`Timers::advance`] and handled in that same loop.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use wayforge_protocol::{
    BlockPos, Location, Notice, Notifier, ParticipantId, WorldOracle, format_clock,
};
use wayforge_tick::{TimerHandle, Timers};

use crate::placement::{pick_start, pick_target};
use crate::{
    CapabilityService, EndCause, GameConfig, GameError, GameSession, MarkerError, MarkerStore,
    RewardDispatcher, SessionMarker, SessionRegistry, Teardown, TickVerdict,
    render_reward_command,
};

/// The host services a [`GameManager`] calls out to.
#[derive(Clone)]
pub struct GameServices {
    pub world: Arc<dyn WorldOracle>,
    pub notifier: Arc<dyn Notifier>,
    /// `None` degrades revocation to bookkeeping only.
    pub capabilities: Option<Arc<dyn CapabilityService>>,
    /// `None` means configured rewards are skipped (with a warning).
    pub rewards: Option<Arc<dyn RewardDispatcher>>,
    pub markers: Arc<dyn MarkerStore>,
}

/// Optional overrides for a single game.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Use this target instead of a random one.
    pub target: Option<Location>,
    /// Use this time limit instead of the configured default.
    pub time_limit_secs: Option<u32>,
}

/// What the caller learns about a freshly started game.
#[derive(Debug, Clone, PartialEq)]
pub struct StartedGame {
    pub start: Location,
    pub target: Location,
    pub time_limit_secs: u32,
    pub radius: f64,
}

/// A status report for a running game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStatus {
    pub remaining_secs: u32,
    /// `remaining_secs` as `m:ss`.
    pub clock: String,
    /// Current distance to the target; `None` if offline or in another world.
    pub distance: Option<f64>,
    pub target: BlockPos,
}

/// Runs timed games for every participant.
pub struct GameManager {
    config: GameConfig,
    /// Engine ticks per game second.
    ticks_per_second: u64,
    registry: SessionRegistry,
    timers: Timers<ParticipantId>,
    services: GameServices,
    rng: StdRng,
}

impl GameManager {
    /// Creates a manager with an OS-seeded RNG.
    pub fn new(config: GameConfig, ticks_per_second: u32, services: GameServices) -> Self {
        Self::with_rng(config, ticks_per_second, services, StdRng::from_os_rng())
    }

    /// Creates a manager whose placement is reproducible.
    pub fn with_seed(
        config: GameConfig,
        ticks_per_second: u32,
        services: GameServices,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, ticks_per_second, services, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: GameConfig,
        ticks_per_second: u32,
        services: GameServices,
        rng: StdRng,
    ) -> Self {
        Self {
            config: config.validated(),
            ticks_per_second: u64::from(ticks_per_second.max(1)),
            registry: SessionRegistry::new(),
            timers: Timers::new(),
            services,
            rng,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Whether the participant has a running game.
    pub fn in_game(&self, participant: ParticipantId) -> bool {
        self.registry.contains(&participant)
    }

    /// Read access to the running sessions.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    // =====================================================================
    // Entry points
    // =====================================================================

    /// Starts a game for `participant`.
    ///
    /// Picks a target (unless one is given) and a start point, revokes the
    /// configured capabilities, moves the participant to the start, and
    /// begins the countdown.
    ///
    /// # Errors
    /// - [`GameError::Disabled`]: the game is switched off
    /// - [`GameError::AlreadyInGame`]: one game per participant
    /// - [`GameError::ParticipantOffline`]: no location for the participant
    /// - [`GameError::Capability`] / [`GameError::Teleport`]: a host
    ///   service failed; anything already revoked is restored first
    pub fn start_game(
        &mut self,
        participant: ParticipantId,
        options: StartOptions,
    ) -> Result<StartedGame, GameError> {
        if !self.config.enabled {
            return Err(GameError::Disabled);
        }
        if self.registry.contains(&participant) {
            return Err(GameError::AlreadyInGame(participant));
        }
        let original = self
            .services
            .world
            .location(participant)
            .ok_or(GameError::ParticipantOffline(participant))?;

        let time_limit_secs = options
            .time_limit_secs
            .unwrap_or(self.config.time_limit_secs)
            .max(1);
        let world = self.services.world.as_ref();
        let target = match options.target {
            Some(target) => target,
            None => pick_target(&original.world, self.config.bounds, world, &mut self.rng),
        };
        let start = pick_start(
            &target,
            self.config.bounds,
            self.config.distance,
            world,
            &mut self.rng,
        );

        let revoked = self.revoke_capabilities(participant)?;
        if let Err(e) = self.services.world.teleport(participant, &start) {
            self.restore_capabilities(participant, &revoked);
            return Err(GameError::Teleport(e));
        }

        let mut session = GameSession::new(
            participant,
            original,
            start.clone(),
            target.clone(),
            time_limit_secs,
        );
        for name in revoked {
            session.record_revoked(name);
        }
        let handle = self.timers.run_every(self.ticks_per_second, participant);
        session.attach_timer(handle);
        let marker = session.marker();
        self.registry.insert(session)?;

        if let Err(e) = self.services.markers.save(participant, &marker) {
            warn!(%participant, error = %e, "failed to save session marker");
        }

        self.services.notifier.notify(
            participant,
            Notice::GameStarted {
                time_limit_secs,
                target: target.block(),
                radius: self.config.target_radius,
            },
        );
        info!(
            %participant,
            %start,
            %target,
            time_limit_secs,
            "game session started"
        );

        Ok(StartedGame {
            start,
            target,
            time_limit_secs,
            radius: self.config.target_radius,
        })
    }

    /// Ends the participant's game on request. No reward.
    ///
    /// Calling it a second time returns [`GameError::NoActiveGame`] and
    /// changes nothing: the first call already removed the session.
    pub fn end_game(&mut self, participant: ParticipantId) -> Result<(), GameError> {
        if !self.config.enabled {
            return Err(GameError::Disabled);
        }
        if !self.finish(participant, EndCause::ManualEnd) {
            return Err(GameError::NoActiveGame(participant));
        }
        Ok(())
    }

    /// Reports remaining time and distance for the participant's game.
    pub fn status(&self, participant: ParticipantId) -> Result<GameStatus, GameError> {
        if !self.config.enabled {
            return Err(GameError::Disabled);
        }
        let session = self
            .registry
            .get(&participant)
            .ok_or(GameError::NoActiveGame(participant))?;

        let distance = self
            .services
            .world
            .location(participant)
            .and_then(|here| self.services.world.distance(&here, session.target_location()));

        Ok(GameStatus {
            remaining_secs: session.remaining_secs(),
            clock: format_clock(session.remaining_secs()),
            distance,
            target: session.target_location().block(),
        })
    }

    /// Tears down the participant's game because they left.
    ///
    /// Safe to call at any time: returns `false` if there was nothing to
    /// tear down (no game, or it already ended).
    pub fn disconnect(&mut self, participant: ParticipantId) -> bool {
        self.finish(participant, EndCause::Disconnect)
    }

    /// Reads a marker left behind by a previous process, for display only.
    pub fn leftover_marker(
        &self,
        participant: ParticipantId,
    ) -> Result<Option<SessionMarker>, MarkerError> {
        self.services.markers.load(participant)
    }

    /// Ends every running game silently. Called when the engine stops.
    pub fn shutdown(&mut self) -> usize {
        let mut ended = 0;
        for participant in self.registry.participants() {
            if self.finish(participant, EndCause::Shutdown) {
                ended += 1;
            }
        }
        ended
    }

    /// Advances the countdown timers by one engine tick.
    pub fn on_tick(&mut self) {
        for (handle, participant) in self.timers.advance() {
            self.run_countdown(handle, participant);
        }
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// One game second for one session.
    fn run_countdown(&mut self, handle: TimerHandle, participant: ParticipantId) {
        let Some(session) = self.registry.get_mut(&participant) else {
            debug!(%participant, %handle, "countdown for missing session ignored");
            return;
        };
        if !session.is_active() || session.timer() != Some(handle) {
            debug!(%participant, %handle, "stale countdown ignored");
            return;
        }

        let Some(here) = self.services.world.location(participant) else {
            self.finish(participant, EndCause::Disconnect);
            return;
        };
        let distance = self.services.world.distance(&here, session.target_location());

        match session.tick(distance, self.config.target_radius, &self.config.warning_secs) {
            TickVerdict::Reached => {
                self.finish(participant, EndCause::Success);
            }
            TickVerdict::TimedOut => {
                self.finish(participant, EndCause::Timeout);
            }
            TickVerdict::Continue {
                warning: Some(remaining_secs),
            } => {
                self.services
                    .notifier
                    .notify(participant, Notice::TimeWarning { remaining_secs });
            }
            TickVerdict::Continue { warning: None } | TickVerdict::Inactive => {}
        }
    }

    /// The single terminal path. Returns `true` if this call ended the game.
    fn finish(&mut self, participant: ParticipantId, cause: EndCause) -> bool {
        let Some(session) = self.registry.get_mut(&participant) else {
            return false;
        };
        let Some(teardown) = session.conclude(cause) else {
            return false;
        };
        self.release(participant, &teardown);

        match cause {
            EndCause::Success => {
                self.grant_rewards(participant);
                self.services.notifier.notify(participant, Notice::GameWon);
            }
            EndCause::Timeout => {
                self.services.notifier.notify(participant, Notice::GameTimedOut);
            }
            EndCause::ManualEnd => {
                self.services.notifier.notify(participant, Notice::GameEnded);
            }
            EndCause::Disconnect | EndCause::Shutdown => {}
        }

        info!(
            %participant,
            ?cause,
            remaining_secs = teardown.remaining_secs,
            "game session ended"
        );
        true
    }

    /// Timer, capabilities, registry entry, marker, in that order.
    fn release(&mut self, participant: ParticipantId, teardown: &Teardown) {
        if let Some(handle) = teardown.timer {
            self.timers.cancel(handle);
        }
        self.restore_capabilities(participant, &teardown.capabilities);
        self.registry.remove(&participant);
        if let Err(e) = self.services.markers.clear(participant) {
            warn!(%participant, error = %e, "failed to clear session marker");
        }
    }

    /// Revokes the configured capabilities the participant currently has.
    ///
    /// All-or-nothing: if one removal fails, the ones already removed are
    /// given back before the error is returned.
    fn revoke_capabilities(&self, participant: ParticipantId) -> Result<Vec<String>, GameError> {
        let Some(service) = &self.services.capabilities else {
            if !self.config.revoked_capabilities.is_empty() {
                debug!(%participant, "no capability service, tracking revocations only");
            }
            return Ok(self.config.revoked_capabilities.clone());
        };

        let mut revoked = Vec::new();
        for name in &self.config.revoked_capabilities {
            if !service.has(participant, name) {
                continue;
            }
            if let Err(e) = service.remove(participant, name) {
                self.restore_capabilities(participant, &revoked);
                return Err(GameError::Capability(e));
            }
            revoked.push(name.clone());
        }
        Ok(revoked)
    }

    fn restore_capabilities(&self, participant: ParticipantId, names: &[String]) {
        let Some(service) = &self.services.capabilities else {
            return;
        };
        for name in names {
            if let Err(e) = service.add(participant, name) {
                warn!(%participant, capability = %name, error = %e, "failed to restore capability");
            }
        }
    }

    fn grant_rewards(&self, participant: ParticipantId) {
        if self.config.reward_commands.is_empty() {
            return;
        }
        let Some(dispatcher) = &self.services.rewards else {
            warn!(%participant, "rewards configured but no dispatcher installed");
            return;
        };
        let name = self.services.world.display_name(participant);
        for template in &self.config.reward_commands {
            let command = render_reward_command(template, &name);
            if let Err(e) = dispatcher.dispatch(participant, &command) {
                warn!(%participant, %command, error = %e, "reward command failed");
            }
        }
    }
}
