//! Engine actor: the single task that owns the [`Engine`].
//!
//! Commands from any number of callers arrive on an mpsc channel; ticks
//! arrive from a [`TickClock`]. One `tokio::select!` loop serves both, so
//! every mutation (start, accept, countdown, expiry, disconnect...) runs
//! one at a time, in arrival order. That is the whole concurrency story:
//! no locks around the registries, and no timer callback can interleave
//! with a command.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use wayforge_protocol::ParticipantId;
use wayforge_request::{Accepted, RequestError, RequestId};
use wayforge_session::{GameError, GameStatus, StartOptions, StartedGame};
use wayforge_tick::TickClock;

use crate::{Departure, Engine, MenuAction, MenuOutcome, ShutdownSummary, WayforgeError};

/// Default command channel size for the engine actor.
const DEFAULT_CHANNEL_SIZE: usize = 256;

/// Commands sent to the engine actor.
///
/// Every variant carries a `oneshot::Sender` reply channel: the caller
/// sends the command and waits for the answer on it.
enum Command {
    StartGame {
        participant: ParticipantId,
        options: StartOptions,
        reply: oneshot::Sender<Result<StartedGame, GameError>>,
    },
    EndGame {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    GameStatus {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<GameStatus, GameError>>,
    },
    SendRequest {
        requester: ParticipantId,
        target: ParticipantId,
        reply: oneshot::Sender<Result<RequestId, RequestError>>,
    },
    AcceptRequest {
        target: ParticipantId,
        reply: oneshot::Sender<Result<Accepted, RequestError>>,
    },
    DenyRequest {
        target: ParticipantId,
        reply: oneshot::Sender<Result<ParticipantId, RequestError>>,
    },
    CancelRequest {
        requester: ParticipantId,
        reply: oneshot::Sender<Result<ParticipantId, RequestError>>,
    },
    ToggleRequests {
        participant: ParticipantId,
        reply: oneshot::Sender<bool>,
    },
    Menu {
        participant: ParticipantId,
        action: MenuAction,
        reply: oneshot::Sender<Result<MenuOutcome, WayforgeError>>,
    },
    Disconnect {
        participant: ParticipantId,
        reply: oneshot::Sender<Departure>,
    },
    Shutdown {
        reply: oneshot::Sender<ShutdownSummary>,
    },
}

/// Handle to the running engine actor.
///
/// Cheap to clone (it wraps an `mpsc::Sender`). Hand one to every command
/// handler and event listener in the host.
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<Command>,
}

impl EngineHandle {
    /// Sends a command and waits for its reply.
    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, WayforgeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| WayforgeError::Unavailable)?;
        reply_rx.await.map_err(|_| WayforgeError::Unavailable)
    }

    pub async fn start_game(
        &self,
        participant: ParticipantId,
        options: StartOptions,
    ) -> Result<StartedGame, WayforgeError> {
        let result = self
            .call(|reply| Command::StartGame {
                participant,
                options,
                reply,
            })
            .await?;
        Ok(result?)
    }

    pub async fn end_game(&self, participant: ParticipantId) -> Result<(), WayforgeError> {
        let result = self
            .call(|reply| Command::EndGame { participant, reply })
            .await?;
        Ok(result?)
    }

    pub async fn game_status(
        &self,
        participant: ParticipantId,
    ) -> Result<GameStatus, WayforgeError> {
        let result = self
            .call(|reply| Command::GameStatus { participant, reply })
            .await?;
        Ok(result?)
    }

    pub async fn send_request(
        &self,
        requester: ParticipantId,
        target: ParticipantId,
    ) -> Result<RequestId, WayforgeError> {
        let result = self
            .call(|reply| Command::SendRequest {
                requester,
                target,
                reply,
            })
            .await?;
        Ok(result?)
    }

    pub async fn accept_request(&self, target: ParticipantId) -> Result<Accepted, WayforgeError> {
        let result = self
            .call(|reply| Command::AcceptRequest { target, reply })
            .await?;
        Ok(result?)
    }

    pub async fn deny_request(
        &self,
        target: ParticipantId,
    ) -> Result<ParticipantId, WayforgeError> {
        let result = self
            .call(|reply| Command::DenyRequest { target, reply })
            .await?;
        Ok(result?)
    }

    pub async fn cancel_request(
        &self,
        requester: ParticipantId,
    ) -> Result<ParticipantId, WayforgeError> {
        let result = self
            .call(|reply| Command::CancelRequest { requester, reply })
            .await?;
        Ok(result?)
    }

    /// Flips the participant's "accept requests" switch; returns the new value.
    pub async fn toggle_requests(&self, participant: ParticipantId) -> Result<bool, WayforgeError> {
        self.call(|reply| Command::ToggleRequests { participant, reply })
            .await
    }

    pub async fn menu(
        &self,
        participant: ParticipantId,
        action: MenuAction,
    ) -> Result<MenuOutcome, WayforgeError> {
        self.call(|reply| Command::Menu {
            participant,
            action,
            reply,
        })
        .await?
    }

    /// Call from the host's quit/leave event.
    pub async fn disconnect(&self, participant: ParticipantId) -> Result<Departure, WayforgeError> {
        self.call(|reply| Command::Disconnect { participant, reply })
            .await
    }

    /// Stops the actor after tearing everything down. Later calls on any
    /// handle return [`WayforgeError::Unavailable`].
    pub async fn shutdown(&self) -> Result<ShutdownSummary, WayforgeError> {
        self.call(|reply| Command::Shutdown { reply }).await
    }

    /// Whether the actor is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Moves `engine` into its own task, ticking at the engine's configured
/// rate.
///
/// Returns the handle for sending commands and the task's `JoinHandle`.
/// The actor stops on [`EngineHandle::shutdown`] or when every handle has
/// been dropped; either way the engine is shut down first.
pub fn spawn_engine(engine: Engine) -> (EngineHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);
    let clock = TickClock::new(engine.config().tick_config());
    let actor = EngineActor {
        engine,
        clock,
        receiver: rx,
    };
    let task = tokio::spawn(actor.run());
    (EngineHandle { sender: tx }, task)
}

/// The actor state. Runs inside a Tokio task.
struct EngineActor {
    engine: Engine,
    clock: TickClock,
    receiver: mpsc::Receiver<Command>,
}

impl EngineActor {
    async fn run(mut self) {
        tracing::info!(
            tick_ms = self.clock.tick_duration().as_millis() as u64,
            policy = ?self.clock.policy(),
            "engine actor started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if !self.handle(cmd) {
                                break;
                            }
                        }
                        None => {
                            tracing::info!("all engine handles dropped");
                            self.engine.shutdown();
                            break;
                        }
                    }
                }
                info = self.clock.wait_for_tick() => {
                    if info.overrun {
                        tracing::debug!(
                            tick = info.tick,
                            skipped = info.ticks_skipped,
                            games = self.engine.games().registry().len(),
                            "engine tick ran late"
                        );
                    }
                    self.engine.tick();
                }
            }
        }

        tracing::info!(ticks = self.clock.tick_count(), "engine actor stopped");
    }

    /// Applies one command. Returns `false` once the actor should stop.
    fn handle(&mut self, cmd: Command) -> bool {
        let engine = &mut self.engine;
        match cmd {
            Command::StartGame {
                participant,
                options,
                reply,
            } => {
                let _ = reply.send(engine.start_game(participant, options));
            }
            Command::EndGame { participant, reply } => {
                let _ = reply.send(engine.end_game(participant));
            }
            Command::GameStatus { participant, reply } => {
                let _ = reply.send(engine.game_status(participant));
            }
            Command::SendRequest {
                requester,
                target,
                reply,
            } => {
                let _ = reply.send(engine.send_request(requester, target));
            }
            Command::AcceptRequest { target, reply } => {
                let _ = reply.send(engine.accept_request(target));
            }
            Command::DenyRequest { target, reply } => {
                let _ = reply.send(engine.deny_request(target));
            }
            Command::CancelRequest { requester, reply } => {
                let _ = reply.send(engine.cancel_request(requester));
            }
            Command::ToggleRequests { participant, reply } => {
                let _ = reply.send(engine.toggle_requests(participant));
            }
            Command::Menu {
                participant,
                action,
                reply,
            } => {
                let _ = reply.send(engine.handle_menu(participant, action));
            }
            Command::Disconnect { participant, reply } => {
                let _ = reply.send(engine.disconnect(participant));
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(engine.shutdown());
                return false;
            }
        }
        true
    }
}
