//! Time-driven room policies for Parlor.
//!
//! A room has two deadlines it may be waiting on:
//!
//! - **Empty-room sweep**: armed when the last player leaves. When it
//!   fires, the room is deleted if it is still empty.
//! - **Post-game reset**: armed when a game finishes. When it fires, the
//!   room drops the finished game and goes back to waiting.
//!
//! Both are plain deadlines held in [`LifecycleTimers`]; nothing is
//! spawned. Cancelling a timer is just clearing its slot, and dropping the
//! timers (because the room actor stopped) cancels everything.
//!
//! # Integration
//!
//! The timers sit inside a room actor's `tokio::select!` loop, so a firing
//! is serialized with the room's client events:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* may schedule or cancel */ }
//!         action = timers.next_due() => match action {
//!             LifecycleAction::SweepEmptyRoom => { /* delete if still empty */ }
//!             LifecycleAction::ResetGame => { /* back to waiting */ }
//!         }
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Grace periods for the two room timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// How long an empty room survives before it is deleted.
    pub empty_room_grace: Duration,
    /// How long a finished game stays visible before the room resets.
    pub reset_grace: Duration,
}

impl LifecycleConfig {
    /// Default time an empty room is kept: five minutes.
    pub const DEFAULT_EMPTY_ROOM_GRACE: Duration = Duration::from_secs(5 * 60);
    /// Default time a finished game is shown: ten seconds.
    pub const DEFAULT_RESET_GRACE: Duration = Duration::from_secs(10);
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            empty_room_grace: Self::DEFAULT_EMPTY_ROOM_GRACE,
            reset_grace: Self::DEFAULT_RESET_GRACE,
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// What the room should do now that a deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// The empty-room grace elapsed. Delete the room if nobody came back.
    SweepEmptyRoom,
    /// The reset grace elapsed. Clear the finished game.
    ResetGame,
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

/// The pending deadlines of one room.
///
/// One `LifecycleTimers` per room actor. Each timer fires at most once per
/// `schedule_*` call; scheduling again replaces the earlier deadline.
#[derive(Debug)]
pub struct LifecycleTimers {
    config: LifecycleConfig,
    sweep_at: Option<Instant>,
    reset_at: Option<Instant>,
}

impl LifecycleTimers {
    /// Creates timers with nothing scheduled.
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            config,
            sweep_at: None,
            reset_at: None,
        }
    }

    /// Arms the empty-room sweep, `empty_room_grace` from now.
    pub fn schedule_sweep(&mut self) {
        let at = Instant::now() + self.config.empty_room_grace;
        debug!(grace = ?self.config.empty_room_grace, "empty-room sweep scheduled");
        self.sweep_at = Some(at);
    }

    /// Disarms the empty-room sweep. Returns `true` if it was armed.
    pub fn cancel_sweep(&mut self) -> bool {
        let was_armed = self.sweep_at.take().is_some();
        if was_armed {
            debug!("empty-room sweep cancelled");
        }
        was_armed
    }

    /// Arms the post-game reset, `reset_grace` from now.
    pub fn schedule_reset(&mut self) {
        let at = Instant::now() + self.config.reset_grace;
        debug!(grace = ?self.config.reset_grace, "game reset scheduled");
        self.reset_at = Some(at);
    }

    /// Disarms the post-game reset. Returns `true` if it was armed.
    pub fn cancel_reset(&mut self) -> bool {
        self.reset_at.take().is_some()
    }

    /// Disarms both timers.
    pub fn cancel_all(&mut self) {
        self.sweep_at = None;
        self.reset_at = None;
    }

    /// Whether the empty-room sweep is armed.
    pub fn is_sweep_scheduled(&self) -> bool {
        self.sweep_at.is_some()
    }

    /// Whether the post-game reset is armed.
    pub fn is_reset_scheduled(&self) -> bool {
        self.reset_at.is_some()
    }

    /// Waits for the earliest armed deadline and returns its action.
    ///
    /// The fired timer is disarmed before returning. With nothing armed
    /// this future pends forever, which lets the other `select!` branches
    /// run.
    ///
    /// Cancel-safe: the timers are only touched after the sleep completes,
    /// so dropping this future inside `select!` loses nothing.
    pub async fn next_due(&mut self) -> LifecycleAction {
        let (at, action) = match (self.reset_at, self.sweep_at) {
            (Some(reset), Some(sweep)) if sweep < reset => {
                (sweep, LifecycleAction::SweepEmptyRoom)
            }
            (Some(reset), _) => (reset, LifecycleAction::ResetGame),
            (None, Some(sweep)) => (sweep, LifecycleAction::SweepEmptyRoom),
            (None, None) => std::future::pending().await,
        };

        time::sleep_until(at).await;

        match action {
            LifecycleAction::SweepEmptyRoom => self.sweep_at = None,
            LifecycleAction::ResetGame => self.reset_at = None,
        }
        trace!(?action, "lifecycle timer fired");
        action
    }
}
