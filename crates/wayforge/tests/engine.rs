//! Integration tests for the engine: menu dispatch, disconnect fan-out,
//! and the actor loop under paused Tokio time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wayforge::prelude::*;

// =========================================================================
// Mock world
// =========================================================================

#[derive(Default)]
struct World {
    locations: Mutex<HashMap<ParticipantId, Location>>,
}

impl World {
    fn with_online(ids: &[u64]) -> Arc<Self> {
        let world = Self::default();
        for id in ids {
            world.place(ParticipantId(*id), Location::new("world", *id as f64 * 10.0, 64.0, 0.0));
        }
        Arc::new(world)
    }

    fn place(&self, p: ParticipantId, at: Location) {
        self.locations.lock().unwrap().insert(p, at);
    }
}

impl WorldOracle for World {
    fn location(&self, participant: ParticipantId) -> Option<Location> {
        self.locations.lock().unwrap().get(&participant).cloned()
    }

    fn highest_standable_y(&self, _world: &str, _x: i32, _z: i32) -> i32 {
        64
    }

    fn teleport(&self, participant: ParticipantId, to: &Location) -> Result<(), ServiceError> {
        self.place(participant, to.clone());
        Ok(())
    }
}

const A: ParticipantId = ParticipantId(1);
const B: ParticipantId = ParticipantId(2);
const C: ParticipantId = ParticipantId(3);

fn target() -> Location {
    Location::block_centre("world", 100, 70, 100)
}

fn fixed_target() -> StartOptions {
    StartOptions {
        target: Some(target()),
        time_limit_secs: Some(300),
    }
}

fn engine_with(world: Arc<World>) -> (Engine, NoticeReceiver) {
    let (notifier, notices) = ChannelNotifier::channel();
    let services = EngineServices::new(world, Arc::new(notifier));
    (Engine::with_seed(EngineConfig::default(), services, 11), notices)
}

fn drain(notices: &mut NoticeReceiver) -> Vec<(ParticipantId, Notice)> {
    let mut out = Vec::new();
    while let Ok(n) = notices.try_recv() {
        out.push(n);
    }
    out
}

// =========================================================================
// Synchronous engine
// =========================================================================

#[test]
fn test_menu_start_status_end() {
    let (mut engine, _notices) = engine_with(World::with_online(&[1]));

    let started = engine
        .handle_menu(A, "start_game".parse().unwrap())
        .unwrap();
    assert!(matches!(started, MenuOutcome::Started(ref s) if s.time_limit_secs == 300));

    for _ in 0..20 {
        engine.tick();
    }
    let status = engine.handle_menu(A, MenuAction::ShowStatus).unwrap();
    assert!(matches!(status, MenuOutcome::Status(ref s) if s.remaining_secs == 299));

    assert_eq!(engine.handle_menu(A, MenuAction::EndGame).unwrap(), MenuOutcome::Ended);
    let again = engine.handle_menu(A, MenuAction::EndGame);
    assert!(matches!(again, Err(WayforgeError::Game(GameError::NoActiveGame(_)))));
}

#[test]
fn test_menu_request_buttons() {
    let (mut engine, mut notices) = engine_with(World::with_online(&[1, 2, 3]));

    engine.send_request(A, B).unwrap();
    let accepted = engine.handle_menu(B, MenuAction::AcceptRequest).unwrap();
    assert!(matches!(accepted, MenuOutcome::Accepted(ref a) if a.requester == A));

    engine.send_request(C, B).unwrap();
    assert_eq!(
        engine.handle_menu(B, MenuAction::DenyRequest).unwrap(),
        MenuOutcome::Denied { requester: C }
    );

    engine.send_request(C, A).unwrap();
    assert_eq!(
        engine.handle_menu(C, MenuAction::CancelRequest).unwrap(),
        MenuOutcome::Cancelled { target: A }
    );

    let missing = engine.handle_menu(B, MenuAction::AcceptRequest);
    assert!(matches!(
        missing,
        Err(WayforgeError::Request(RequestError::NoPendingRequest(_)))
    ));

    let received: Vec<_> = drain(&mut notices)
        .into_iter()
        .filter(|(to, _)| *to == C)
        .map(|(_, n)| n)
        .collect();
    assert_eq!(
        received,
        vec![
            Notice::RequestSent {
                target: B,
                timeout_secs: 60
            },
            Notice::RequestDenied { target: B },
            Notice::RequestSent {
                target: A,
                timeout_secs: 60
            },
        ]
    );
}

#[test]
fn test_menu_close_changes_nothing() {
    let (mut engine, mut notices) = engine_with(World::with_online(&[1]));

    assert_eq!(engine.handle_menu(A, MenuAction::Close).unwrap(), MenuOutcome::Closed);

    assert!(!engine.in_game(A));
    assert!(drain(&mut notices).is_empty());
}

#[test]
fn test_disconnect_ends_game_and_withdraws_requests() {
    let (mut engine, mut notices) = engine_with(World::with_online(&[1, 2, 3]));
    engine.start_game(A, fixed_target()).unwrap();
    engine.send_request(A, B).unwrap();
    engine.send_request(C, A).unwrap();
    drain(&mut notices);

    let departure = engine.disconnect(A);

    assert_eq!(
        departure,
        Departure {
            game_ended: true,
            requests_withdrawn: 2
        }
    );
    assert!(!engine.in_game(A));
    assert!(engine.requests().registry().is_empty());
    let sent = drain(&mut notices);
    assert!(sent.contains(&(B, Notice::RequestWithdrawn { by: A })));
    assert!(sent.contains(&(C, Notice::RequestWithdrawn { by: A })));
    assert!(sent.iter().all(|(to, _)| *to != A));

    assert_eq!(engine.disconnect(A), Departure::default());
}

#[test]
fn test_disabled_game_rejects_menu_start() {
    let (notifier, _notices) = ChannelNotifier::channel();
    let services = EngineServices::new(World::with_online(&[1]), Arc::new(notifier));
    let config = EngineConfig::from_json_str(r#"{ "game": { "enabled": false } }"#).unwrap();
    let mut engine = Engine::new(config, services);

    let result = engine.handle_menu(A, MenuAction::StartGame);

    assert!(matches!(result, Err(WayforgeError::Game(GameError::Disabled))));
}

#[test]
fn test_shutdown_summary_counts_everything() {
    let (mut engine, _notices) = engine_with(World::with_online(&[1, 2, 3]));
    engine.start_game(A, fixed_target()).unwrap();
    engine.start_game(B, fixed_target()).unwrap();
    engine.send_request(C, A).unwrap();

    let summary = engine.shutdown();

    assert_eq!(
        summary,
        ShutdownSummary {
            games_ended: 2,
            requests_dropped: 1
        }
    );
    assert!(engine.games().registry().is_empty());
}

// =========================================================================
// Actor
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_actor_counts_down_with_wall_clock() {
    let (engine, _notices) = engine_with(World::with_online(&[1]));
    let (handle, _task) = spawn_engine(engine);

    handle.start_game(A, fixed_target()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1025)).await;

    let status = handle.game_status(A).await.unwrap();
    assert_eq!(status.remaining_secs, 299);
    assert_eq!(status.clock, "4:59");
}

#[tokio::test(start_paused = true)]
async fn test_actor_expires_request_after_timeout() {
    let (engine, mut notices) = engine_with(World::with_online(&[1, 2]));
    let (handle, _task) = spawn_engine(engine);

    handle.send_request(A, B).await.unwrap();
    assert_eq!(
        notices.recv().await.unwrap(),
        (
            B,
            Notice::RequestReceived {
                requester: A,
                timeout_secs: 60
            }
        )
    );
    assert_eq!(
        notices.recv().await.unwrap(),
        (
            A,
            Notice::RequestSent {
                target: B,
                timeout_secs: 60
            }
        )
    );

    tokio::time::sleep(Duration::from_millis(60_025)).await;

    assert_eq!(
        notices.recv().await.unwrap(),
        (A, Notice::RequestExpired { target: B })
    );
    let late = handle.accept_request(B).await;
    assert!(matches!(
        late,
        Err(WayforgeError::Request(RequestError::NoPendingRequest(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_actor_menu_and_toggle() {
    let (engine, _notices) = engine_with(World::with_online(&[1, 2]));
    let (handle, _task) = spawn_engine(engine);

    assert!(!handle.toggle_requests(B).await.unwrap());
    let refused = handle.send_request(A, B).await;
    assert!(matches!(
        refused,
        Err(WayforgeError::Request(RequestError::TargetDisabled(_)))
    ));

    let outcome = handle.menu(A, MenuAction::StartGame).await.unwrap();
    assert!(matches!(outcome, MenuOutcome::Started(_)));
}

#[tokio::test(start_paused = true)]
async fn test_actor_shutdown_then_unavailable() {
    let (engine, _notices) = engine_with(World::with_online(&[1]));
    let (handle, task) = spawn_engine(engine);
    handle.start_game(A, fixed_target()).await.unwrap();

    let summary = handle.shutdown().await.unwrap();
    assert_eq!(summary.games_ended, 1);

    task.await.unwrap();
    assert!(!handle.is_running());
    assert!(matches!(
        handle.game_status(A).await,
        Err(WayforgeError::Unavailable)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_actor_stops_when_every_handle_dropped() {
    let (engine, _notices) = engine_with(World::with_online(&[1]));
    let (handle, task) = spawn_engine(engine);
    let second = handle.clone();

    drop(handle);
    drop(second);

    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("actor should stop")
        .unwrap();
}
