//! Safety model: travel-time and hazard-closing-time predictions.
//!
//! Times are measured in game ticks. The hazard is predicted linearly from its
//! latest observed x; nothing here models its actual motion. Each policy
//! supplies its own margin, the cost model is shared.

use crate::config::GameConstants;
use crate::geometry::Position;

/// Shared cost model for every targeting policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyModel {
    speed_base: f64,
    speed_per_level: f64,
    hazard_speed: f64,
}

impl SafetyModel {
    pub fn new(constants: &GameConstants) -> Self {
        Self {
            speed_base: constants.speed.base,
            speed_per_level: constants.speed.per_level,
            hazard_speed: constants.hazard.speed,
        }
    }

    /// Units per tick at the given speed level.
    pub fn player_speed(&self, speed_level: u32) -> f64 {
        self.speed_base + (speed_level as f64 - 1.0) * self.speed_per_level
    }

    /// Ticks to reach a target and pick it up (the extra tick is the pickup).
    pub fn ticks_to_collect(&self, player: &Position, target: &Position, speed_level: u32) -> f64 {
        player.distance(target) / self.player_speed(speed_level) + 1.0
    }

    /// Ticks to carry a target back to the deposit point.
    pub fn ticks_to_return(&self, target: &Position, deposit: &Position, speed_level: u32) -> f64 {
        target.distance(deposit) / self.player_speed(speed_level)
    }

    /// Ticks until the front reaches the deposit point's x.
    pub fn ticks_until_hazard(&self, deposit: &Position, hazard_x: f64) -> f64 {
        (deposit.x - hazard_x) / self.hazard_speed
    }

    /// Full round trip: player → target → deposit.
    pub fn round_trip_ticks(
        &self,
        player: &Position,
        target: &Position,
        deposit: &Position,
        speed_level: u32,
    ) -> f64 {
        self.ticks_to_collect(player, target, speed_level)
            + self.ticks_to_return(target, deposit, speed_level)
    }
}

/// A plan needing `ticks_needed` is safe if it finishes `margin` ticks
/// before the hazard arrives.
pub fn reachable(ticks_needed: f64, ticks_until_hazard: f64, margin: f64) -> bool {
    ticks_needed < ticks_until_hazard - margin
}
