//! Ticks and timers for Wayforge.
//!
//! Two pieces, one for each half of "the scheduler":
//!
//! - [`TickClock`]: wall-clock side. Resolves once per tick at a fixed
//!   rate, like a game server's main loop.
//! - [`Timers`]: logical side. "Run this every N ticks", "run this once
//!   after N ticks", "cancel that". Instead of invoking callbacks, due
//!   timers hand back *events* which the engine processes on its single
//!   mutation loop.
//!
//! # Integration
//!
//! Both sit inside the engine actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* start game, accept request, ... */ }
//!         _ = clock.wait_for_tick() => {
//!             for (handle, event) in timers.advance() {
//!                 /* guarded: stale events are no-ops */
//!             }
//!         }
//!     }
//! }
//! ```

mod clock;
mod timers;

pub use clock::{TickClock, TickConfig, TickInfo, TickPolicy};
pub use timers::{TimerHandle, Timers};
