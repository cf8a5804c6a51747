//! Room configuration.

use parlor_lifecycle::LifecycleConfig;

/// Configuration for a room instance.
///
/// Games can override these defaults by implementing
/// `GameLogic::room_config()`; the server may then swap in its own
/// [`LifecycleConfig`].
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Minimum players required to start a game, and to keep one going.
    pub min_players: usize,

    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// Capacity of the room actor's command channel. Senders wait when
    /// it is full.
    pub channel_size: usize,

    /// Empty-room and post-game grace periods.
    pub lifecycle: LifecycleConfig,
}

impl RoomConfig {
    /// Returns a copy with different grace periods.
    pub fn with_lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 4,
            channel_size: 64,
            lifecycle: LifecycleConfig::default(),
        }
    }
}
