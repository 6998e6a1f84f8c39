use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wayforge::prelude::*;

// ---------------------------------------------------------------------------
// An in-memory host
// ---------------------------------------------------------------------------

const ALEX: ParticipantId = ParticipantId(1);
const SAM: ParticipantId = ParticipantId(2);

/// Blocks per second the runner covers.
const RUNNER_SPEED: f64 = 12.0;

const CONFIG: &str = r#"{
    "tick_rate_hz": 20,
    "game": {
        "time_limit_secs": 30,
        "target_radius": 3.0,
        "distance": { "min": 40, "max": 60 },
        "bounds": { "min": -200, "max": 200 },
        "reward_commands": ["/give {player} diamond 1"],
        "warning_secs": [10, 5]
    },
    "requests": { "cost": 5.0, "timeout_secs": 30 }
}"#;

#[derive(Default)]
struct Arena {
    locations: Mutex<HashMap<ParticipantId, Location>>,
    names: HashMap<ParticipantId, &'static str>,
}

impl Arena {
    fn new() -> Self {
        let arena = Self {
            names: HashMap::from([(ALEX, "Alex"), (SAM, "Sam")]),
            ..Self::default()
        };
        arena.put(ALEX, Location::new("world", 0.5, 64.0, 0.5));
        arena.put(SAM, Location::new("world", 30.5, 64.0, -12.5));
        arena
    }

    fn put(&self, p: ParticipantId, at: Location) {
        self.locations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(p, at);
    }

    /// Moves `p` up to `step` blocks towards `goal`. Returns `true` on arrival.
    fn step_towards(&self, p: ParticipantId, goal: &Location, step: f64) -> bool {
        let mut locations = self.locations.lock().unwrap_or_else(|e| e.into_inner());
        let Some(here) = locations.get_mut(&p) else {
            return true;
        };
        let (dx, dz) = (goal.x - here.x, goal.z - here.z);
        let remaining = dx.hypot(dz);
        if remaining <= step {
            *here = goal.clone();
            return true;
        }
        here.x += dx / remaining * step;
        here.z += dz / remaining * step;
        false
    }
}

impl WorldOracle for Arena {
    fn location(&self, participant: ParticipantId) -> Option<Location> {
        self.locations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&participant)
            .cloned()
    }

    fn highest_standable_y(&self, _world: &str, x: i32, z: i32) -> i32 {
        64 + (x / 16 + z / 16).rem_euclid(4)
    }

    fn teleport(&self, participant: ParticipantId, to: &Location) -> Result<(), ServiceError> {
        self.put(participant, to.clone());
        Ok(())
    }

    fn display_name(&self, participant: ParticipantId) -> String {
        self.names
            .get(&participant)
            .map(|n| n.to_string())
            .unwrap_or_else(|| participant.to_string())
    }
}

struct Purse {
    balances: Mutex<HashMap<ParticipantId, f64>>,
}

impl Ledger for Purse {
    fn balance(&self, participant: ParticipantId) -> f64 {
        let balances = self.balances.lock().unwrap_or_else(|e| e.into_inner());
        balances.get(&participant).copied().unwrap_or(0.0)
    }

    fn withdraw(&self, participant: ParticipantId, amount: f64) -> Result<(), ServiceError> {
        let mut balances = self.balances.lock().unwrap_or_else(|e| e.into_inner());
        let balance = balances.entry(participant).or_default();
        if *balance < amount {
            return Err(ServiceError::Rejected(format!("{participant} cannot pay {amount}")));
        }
        *balance -= amount;
        Ok(())
    }
}

struct ConsoleRewards;

impl RewardDispatcher for ConsoleRewards {
    fn dispatch(&self, participant: ParticipantId, command: &str) -> Result<(), ServiceError> {
        tracing::info!(%participant, %command, "console: dispatching reward");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// The chase
// ---------------------------------------------------------------------------

struct ChaseReport {
    won: bool,
    sam_balance: f64,
    notices: Vec<(ParticipantId, Notice)>,
}

async fn run_chase() -> Result<ChaseReport, WayforgeError> {
    let arena = Arc::new(Arena::new());
    let purse = Arc::new(Purse {
        balances: Mutex::new(HashMap::from([(SAM, 20.0)])),
    });
    let (notifier, mut notices) = ChannelNotifier::channel();

    let services = EngineServices::new(arena.clone(), Arc::new(notifier))
        .with_ledger(purse.clone())
        .with_rewards(Arc::new(ConsoleRewards));
    let engine = Engine::new(EngineConfig::from_json_str(CONFIG)?, services);
    let (handle, task) = spawn_engine(engine);

    let collector = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some((to, notice)) = notices.recv().await {
            tracing::info!(%to, key = notice.key(), ?notice, "notice");
            seen.push((to, notice));
        }
        seen
    });

    // Sam asks to join Alex before the game; Alex accepts from the menu.
    handle.send_request(SAM, ALEX).await?;
    let action: MenuAction = "accept_request".parse()?;
    handle.menu(ALEX, action).await?;

    let started = handle.start_game(ALEX, StartOptions::default()).await?;
    tracing::info!(start = %started.start, target = %started.target, "chase on");

    let runner_arena = Arc::clone(&arena);
    let goal = started.target.clone();
    let runner = tokio::spawn(async move {
        let mut stride = tokio::time::interval(Duration::from_millis(100));
        loop {
            stride.tick().await;
            if runner_arena.step_towards(ALEX, &goal, RUNNER_SPEED / 10.0) {
                break;
            }
        }
    });

    let mut poll = tokio::time::interval(Duration::from_millis(500));
    loop {
        poll.tick().await;
        match handle.game_status(ALEX).await {
            Ok(status) => {
                tracing::debug!(clock = %status.clock, distance = ?status.distance, "alex running");
            }
            Err(WayforgeError::Game(GameError::NoActiveGame(_))) => break,
            Err(e) => return Err(e),
        }
    }
    runner.abort();

    handle.shutdown().await?;
    let _ = task.await;
    let notices = collector.await.unwrap_or_default();

    Ok(ChaseReport {
        won: notices.contains(&(ALEX, Notice::GameWon)),
        sam_balance: purse.balance(SAM),
        notices,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    wayforge::init_tracing();

    let report = run_chase().await?;
    tracing::info!(
        won = report.won,
        sam_balance = report.sam_balance,
        notices = report.notices.len(),
        "chase finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_chase_runner_reaches_target() {
        let report = run_chase().await.unwrap();

        assert!(report.won);
        assert_eq!(report.sam_balance, 15.0);
        assert!(
            report
                .notices
                .contains(&(SAM, Notice::Teleported { target: ALEX, cost: Some(5.0) }))
        );
        assert!(!report.notices.iter().any(|(_, n)| *n == Notice::GameTimedOut));
    }
}
