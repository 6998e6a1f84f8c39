//! The engine: both workflows behind one set of entry points.
//!
//! [`Engine`] is synchronous. It owns the [`GameManager`] and the
//! [`RequestManager`] and is meant to live on exactly one task, either
//! the actor started by [`spawn_engine`](crate::spawn_engine) or a host's
//! own main loop calling [`Engine::tick`] at the configured rate.

use std::sync::Arc;

use tracing::info;
use wayforge_protocol::{Notifier, ParticipantId, WorldOracle};
use wayforge_request::{
    Accepted, Ledger, MemoryPreferences, RequestError, RequestId, RequestManager,
    RequestPreferences, RequestServices,
};
use wayforge_session::{
    CapabilityService, GameError, GameManager, GameServices, GameStatus, MarkerError, MarkerStore,
    MemoryMarkerStore, RewardDispatcher, SessionMarker, StartOptions, StartedGame,
};

use crate::{EngineConfig, MenuAction, MenuOutcome, WayforgeError};

/// Host services for the whole engine.
///
/// Only the world and the notifier are required; everything else has a
/// fallback (see the `with_*` methods).
#[derive(Clone)]
pub struct EngineServices {
    world: Arc<dyn WorldOracle>,
    notifier: Arc<dyn Notifier>,
    capabilities: Option<Arc<dyn CapabilityService>>,
    rewards: Option<Arc<dyn RewardDispatcher>>,
    markers: Option<Arc<dyn MarkerStore>>,
    ledger: Option<Arc<dyn Ledger>>,
    preferences: Option<Arc<dyn RequestPreferences>>,
}

impl EngineServices {
    pub fn new(world: Arc<dyn WorldOracle>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            world,
            notifier,
            capabilities: None,
            rewards: None,
            markers: None,
            ledger: None,
            preferences: None,
        }
    }

    /// Without one, revoked capabilities are only tracked.
    pub fn with_capabilities(mut self, service: Arc<dyn CapabilityService>) -> Self {
        self.capabilities = Some(service);
        self
    }

    /// Without one, reward commands are skipped.
    pub fn with_rewards(mut self, dispatcher: Arc<dyn RewardDispatcher>) -> Self {
        self.rewards = Some(dispatcher);
        self
    }

    /// Defaults to an in-memory store.
    pub fn with_markers(mut self, store: Arc<dyn MarkerStore>) -> Self {
        self.markers = Some(store);
        self
    }

    /// Without one, requests are free.
    pub fn with_ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Defaults to in-memory preferences seeded from
    /// `requests.default_accepts`.
    pub fn with_preferences(mut self, preferences: Arc<dyn RequestPreferences>) -> Self {
        self.preferences = Some(preferences);
        self
    }
}

/// What a participant leaving took down with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Departure {
    pub game_ended: bool,
    pub requests_withdrawn: usize,
}

/// What stopping the engine cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownSummary {
    pub games_ended: usize,
    pub requests_dropped: usize,
}

/// Both workflows, driven from one place.
pub struct Engine {
    config: EngineConfig,
    games: GameManager,
    requests: RequestManager,
}

impl Engine {
    pub fn new(config: EngineConfig, services: EngineServices) -> Self {
        Self::build(config, services, None)
    }

    /// Like [`new`](Self::new) with reproducible game placement.
    pub fn with_seed(config: EngineConfig, services: EngineServices, seed: u64) -> Self {
        Self::build(config, services, Some(seed))
    }

    fn build(config: EngineConfig, services: EngineServices, seed: Option<u64>) -> Self {
        let config = config.validated();
        let tps = config.tick_rate_hz;

        let game_services = GameServices {
            world: Arc::clone(&services.world),
            notifier: Arc::clone(&services.notifier),
            capabilities: services.capabilities,
            rewards: services.rewards,
            markers: services
                .markers
                .unwrap_or_else(|| Arc::new(MemoryMarkerStore::new())),
        };
        let request_services = RequestServices {
            world: services.world,
            notifier: services.notifier,
            ledger: services.ledger,
            preferences: services.preferences.unwrap_or_else(|| {
                Arc::new(MemoryPreferences::new(config.requests.default_accepts))
            }),
        };

        let games = match seed {
            Some(seed) => GameManager::with_seed(config.game.clone(), tps, game_services, seed),
            None => GameManager::new(config.game.clone(), tps, game_services),
        };
        let requests = RequestManager::new(config.requests.clone(), tps, request_services);

        info!(
            tick_rate_hz = tps,
            game_enabled = config.game.enabled,
            request_cost = config.requests.cost,
            "engine created"
        );
        Self {
            config,
            games,
            requests,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn games(&self) -> &GameManager {
        &self.games
    }

    pub fn requests(&self) -> &RequestManager {
        &self.requests
    }

    // -- Timed game --

    pub fn start_game(
        &mut self,
        participant: ParticipantId,
        options: StartOptions,
    ) -> Result<StartedGame, GameError> {
        self.games.start_game(participant, options)
    }

    pub fn end_game(&mut self, participant: ParticipantId) -> Result<(), GameError> {
        self.games.end_game(participant)
    }

    pub fn game_status(&self, participant: ParticipantId) -> Result<GameStatus, GameError> {
        self.games.status(participant)
    }

    pub fn in_game(&self, participant: ParticipantId) -> bool {
        self.games.in_game(participant)
    }

    pub fn leftover_marker(
        &self,
        participant: ParticipantId,
    ) -> Result<Option<SessionMarker>, MarkerError> {
        self.games.leftover_marker(participant)
    }

    // -- Teleport requests --

    pub fn send_request(
        &mut self,
        requester: ParticipantId,
        target: ParticipantId,
    ) -> Result<RequestId, RequestError> {
        self.requests.send(requester, target)
    }

    pub fn accept_request(&mut self, target: ParticipantId) -> Result<Accepted, RequestError> {
        self.requests.accept(target)
    }

    pub fn deny_request(&mut self, target: ParticipantId) -> Result<ParticipantId, RequestError> {
        self.requests.deny(target)
    }

    pub fn cancel_request(
        &mut self,
        requester: ParticipantId,
    ) -> Result<ParticipantId, RequestError> {
        self.requests.cancel(requester)
    }

    pub fn toggle_requests(&mut self, participant: ParticipantId) -> bool {
        self.requests.toggle_requests(participant)
    }

    pub fn set_requests(&mut self, participant: ParticipantId, accepts: bool) {
        self.requests.set_requests(participant, accepts);
    }

    // -- Menu --

    /// Runs the action behind a menu button.
    pub fn handle_menu(
        &mut self,
        participant: ParticipantId,
        action: MenuAction,
    ) -> Result<MenuOutcome, WayforgeError> {
        let outcome = match action {
            MenuAction::StartGame => {
                MenuOutcome::Started(self.start_game(participant, StartOptions::default())?)
            }
            MenuAction::EndGame => {
                self.end_game(participant)?;
                MenuOutcome::Ended
            }
            MenuAction::ShowStatus => MenuOutcome::Status(self.game_status(participant)?),
            MenuAction::AcceptRequest => MenuOutcome::Accepted(self.accept_request(participant)?),
            MenuAction::DenyRequest => MenuOutcome::Denied {
                requester: self.deny_request(participant)?,
            },
            MenuAction::CancelRequest => MenuOutcome::Cancelled {
                target: self.cancel_request(participant)?,
            },
            MenuAction::Close => MenuOutcome::Closed,
        };
        Ok(outcome)
    }

    // -- Lifecycle --

    /// One engine tick: game countdowns first, then request expiry.
    pub fn tick(&mut self) {
        self.games.on_tick();
        self.requests.on_tick();
    }

    /// Tears down everything `participant` was part of. Idempotent.
    pub fn disconnect(&mut self, participant: ParticipantId) -> Departure {
        let departure = Departure {
            game_ended: self.games.disconnect(participant),
            requests_withdrawn: self.requests.disconnect(participant),
        };
        if departure.game_ended || departure.requests_withdrawn > 0 {
            info!(
                %participant,
                game_ended = departure.game_ended,
                requests = departure.requests_withdrawn,
                "participant departed"
            );
        }
        departure
    }

    /// Ends every game (restoring capabilities) and drops every request.
    pub fn shutdown(&mut self) -> ShutdownSummary {
        let summary = ShutdownSummary {
            games_ended: self.games.shutdown(),
            requests_dropped: self.requests.shutdown(),
        };
        info!(
            games = summary.games_ended,
            requests = summary.requests_dropped,
            "engine shut down"
        );
        summary
    }
}
