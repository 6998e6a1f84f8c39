//! # Wayforge
//!
//! Timed mini-game sessions and consent-based teleport requests for
//! multiplayer game servers.
//!
//! Two workflows, one engine:
//!
//! - **Timed game**: a participant is dropped somewhere in the world and
//!   must reach a target before the countdown runs out.
//! - **Teleport requests**: one participant asks another for permission
//!   to teleport to them; the request is accepted, denied, cancelled, or
//!   expires.
//!
//! The host implements a handful of ports ([`WorldOracle`], [`Notifier`],
//! optionally [`CapabilityService`], [`RewardDispatcher`], [`Ledger`]...),
//! builds an [`Engine`], and either spawns it as an actor or ticks it from
//! its own main loop.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wayforge::prelude::*;
//!
//! let (notifier, mut notices) = ChannelNotifier::channel();
//! let services = EngineServices::new(Arc::new(MyWorld), Arc::new(notifier));
//! let engine = Engine::new(EngineConfig::default(), services);
//! let (handle, _task) = spawn_engine(engine);
//!
//! handle.start_game(ParticipantId(1), StartOptions::default()).await?;
//! ```

mod actor;
mod config;
mod engine;
mod error;
mod menu;
mod notifier;

pub use actor::{EngineHandle, spawn_engine};
pub use config::EngineConfig;
pub use engine::{Departure, Engine, EngineServices, ShutdownSummary};
pub use error::WayforgeError;
pub use menu::{MenuAction, MenuOutcome};
pub use notifier::{ChannelNotifier, NoticeReceiver};

pub use wayforge_protocol::{
    BlockPos, Location, Notice, Notifier, ParticipantId, ServiceError, WorldOracle,
};
pub use wayforge_tick::TickPolicy;
pub use wayforge_request::{
    Accepted, Ledger, MemoryPreferences, RequestConfig, RequestError, RequestId,
    RequestPreferences,
};
pub use wayforge_session::{
    CapabilityService, FileMarkerStore, GameConfig, GameError, GameStatus, MarkerStore,
    MemoryMarkerStore, RewardDispatcher, SessionMarker, StartOptions, StartedGame,
};

/// Installs a `tracing` subscriber that honours `RUST_LOG`, defaulting to
/// `info`. Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wayforge=info".into()),
        )
        .with_target(false)
        .try_init();
}

/// Everything a host typically needs, in one import.
pub mod prelude {
    pub use crate::{
        Accepted, BlockPos, CapabilityService, ChannelNotifier, Departure, Engine, EngineConfig,
        EngineHandle, EngineServices, FileMarkerStore, GameConfig, GameError, GameStatus, Ledger,
        Location, MarkerStore, MemoryMarkerStore, MemoryPreferences, MenuAction, MenuOutcome,
        Notice, NoticeReceiver, Notifier, ParticipantId, RequestConfig, RequestError, RequestId,
        RequestPreferences, RewardDispatcher, ServiceError, SessionMarker, ShutdownSummary,
        StartOptions, StartedGame, TickPolicy, WayforgeError, WorldOracle, init_tracing, spawn_engine,
    };
}
