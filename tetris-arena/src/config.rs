//! Configuration shared by every room of a directory

use std::time::Duration;

/// Number of sessions that make up one match
pub const ROOM_CAPACITY: usize = 2;

/// Main configuration for a Directory and the rooms it creates
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Fixed tick period of every room (in milliseconds)
    pub tick_interval_ms: u64,

    /// Seed for piece generation. Each room mixes in its own ordinal,
    /// so rooms never share a sequence. None = OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            rng_seed: None,
        }
    }
}

impl ArenaConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick period in milliseconds (clamped to at least 1)
    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms.max(1);
        self
    }

    /// Set the piece generator seed
    pub fn with_rng_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Seed for the room created as number `ordinal`, if seeding is enabled
    pub fn room_seed(&self, ordinal: u64) -> Option<u64> {
        self.rng_seed.map(|seed| seed.wrapping_add(ordinal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArenaConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.room_seed(3), None);
    }

    #[test]
    fn test_builder() {
        let config = ArenaConfig::new()
            .with_tick_interval_ms(0)
            .with_rng_seed(Some(10));
        assert_eq!(config.tick_interval_ms, 1);
        assert_eq!(config.room_seed(0), Some(10));
        assert_eq!(config.room_seed(5), Some(15));
    }
}
