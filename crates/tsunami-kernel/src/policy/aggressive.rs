//! Aggressive-Safe ("tryhard"): the highest rarity it can provably bring home,
//! taken from as far out as the hazard allows.

use tracing::debug;

use super::{approach, farthest, nearest, top_tier, valid_candidates};
use crate::action::Decision;
use crate::config::GameConstants;
use crate::geometry::Position;
use crate::safety::{reachable, SafetyModel};
use crate::snapshot::{ResourceEntity, WorldSnapshot};

/// Base margin in ticks by speed level. Slower players get more slack.
pub fn speed_tier_margin(speed_level: u32) -> f64 {
    match speed_level {
        10.. => 3.0,
        8..=9 => 4.0,
        5..=7 => 5.0,
        _ => 6.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggressiveSafe {
    /// Multiplier on the speed-tier margin
    pub safety_modifier: f64,
}

impl AggressiveSafe {
    pub fn margin(&self, speed_level: u32) -> f64 {
        speed_tier_margin(speed_level) * self.safety_modifier
    }

    /// Round trip player → target → base finishes before the hazard, with margin.
    pub fn can_reach(
        &self,
        snapshot: &WorldSnapshot,
        target: &ResourceEntity,
        model: &SafetyModel,
    ) -> bool {
        let player = &snapshot.player;
        let needed = model.round_trip_ticks(
            &player.position,
            &target.position,
            &player.base_center,
            player.speed_level,
        );
        let until = model.ticks_until_hazard(&player.base_center, snapshot.hazard.x);
        reachable(needed, until, self.margin(player.speed_level))
    }

    pub(super) fn select_action(
        &self,
        snapshot: &WorldSnapshot,
        constants: &GameConstants,
        model: &SafetyModel,
    ) -> Option<Decision> {
        let player = &snapshot.player;
        let valid = valid_candidates(snapshot, constants);
        let reachable: Vec<_> = valid
            .iter()
            .copied()
            .filter(|r| self.can_reach(snapshot, r, model))
            .collect();

        let at_base = player.distance_to_base() < constants.zones.near_base_radius;

        if snapshot.hazard.is_active(constants) && reachable.is_empty() && at_base {
            return Some(Decision::wait("waiting for wave reset"));
        }

        let safe_window = player.money >= constants.aggressive_money_threshold
            && snapshot.hazard.has_passed(&player.base_center)
            && at_base;
        if let Some(target) = safe_window
            .then(|| nearest_valuable(&player.position, &valid))
            .flatten()
        {
            return Some(approach(
                &player.position,
                target,
                constants,
                "aggressive mode - nearest valuable",
            ));
        }

        if let Some((rarity, group)) = top_tier(&reachable) {
            let target = farthest(&player.position, &group)?;
            return Some(approach(
                &player.position,
                target,
                constants,
                format!("targeting {}", rarity),
            ));
        }

        let target = nearest(&player.position, &valid)?;
        debug!(
            index = target.index,
            rarity = %target.rarity,
            hazard_x = snapshot.hazard.x,
            "Nothing reachable, falling back to nearest"
        );
        Some(approach(&player.position, target, constants, "risky nearest fallback").risky())
    }
}

/// Nearest instance of the highest rarity present.
fn nearest_valuable<'a>(
    from: &Position,
    candidates: &[&'a ResourceEntity],
) -> Option<&'a ResourceEntity> {
    let (_, group) = top_tier(candidates)?;
    nearest(from, &group)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::action::Action;
    use crate::rarity::Rarity;

    fn policy() -> AggressiveSafe {
        AggressiveSafe {
            safety_modifier: 1.0,
        }
    }

    fn select(snapshot: &WorldSnapshot) -> Option<Decision> {
        let c = GameConstants::default();
        policy().select_action(snapshot, &c, &SafetyModel::new(&c))
    }

    #[test]
    fn test_speed_tiers() {
        assert_eq!(speed_tier_margin(1), 6.0);
        assert_eq!(speed_tier_margin(4), 6.0);
        assert_eq!(speed_tier_margin(5), 5.0);
        assert_eq!(speed_tier_margin(8), 4.0);
        assert_eq!(speed_tier_margin(10), 3.0);
        let scaled = AggressiveSafe {
            safety_modifier: 1.1,
        };
        assert!((scaled.margin(10) - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_prefers_rarity_over_distance() {
        // Hazard absent: 17.5 ticks until it would reach base, margin 6
        let snap = snapshot(
            player_at(300.0, 0.0),
            vec![
                resource(0, Rarity::Common, 295.0, 0.0),
                resource(1, Rarity::Legendary, 260.0, 0.0),
            ],
            -500.0,
        );
        let decision = select(&snap).unwrap();
        assert_eq!(decision.rarity, Some(Rarity::Legendary));
        assert_eq!(decision.action, Action::move_to(snap.resources[1].position));
        assert!(!decision.risky);
    }

    #[test]
    fn test_picks_farthest_reachable_of_top_tier() {
        let snap = snapshot(
            player_at(300.0, 0.0),
            vec![
                resource(0, Rarity::Epic, 290.0, 0.0),
                resource(1, Rarity::Epic, 270.0, 0.0),
                // Too far to make it home in time
                resource(2, Rarity::Epic, 100.0, 0.0),
                resource(3, Rarity::Rare, 265.0, 0.0),
            ],
            -500.0,
        );
        let decision = select(&snap).unwrap();
        assert_eq!(decision.action, Action::move_to(snap.resources[1].position));
        assert_eq!(decision.event, "targeting Epic");
    }

    #[test]
    fn test_waits_at_base_when_wave_blocks_everything() {
        let snap = snapshot(
            player_at(370.0, 0.0),
            vec![resource(0, Rarity::Secret, 0.0, 0.0)],
            300.0,
        );
        let decision = select(&snap).unwrap();
        assert_eq!(decision.action, Action::Wait);
    }

    #[test]
    fn test_risky_fallback_away_from_base() {
        let snap = snapshot(
            player_at(200.0, 0.0),
            vec![
                resource(0, Rarity::Secret, 0.0, 0.0),
                resource(1, Rarity::Common, 180.0, 0.0),
            ],
            300.0,
        );
        let decision = select(&snap).unwrap();
        assert!(decision.risky);
        assert_eq!(decision.rarity, Some(Rarity::Common));
        assert_eq!(decision.event, "risky nearest fallback");
    }

    #[test]
    fn test_waits_after_wave_passes_base_even_when_rich() {
        let mut player = player_at(370.0, 0.0);
        player.money = 3000.0;
        let snap = snapshot(
            player,
            vec![
                resource(0, Rarity::Secret, 300.0, 0.0),
                resource(1, Rarity::Common, 340.0, 0.0),
            ],
            380.0,
        );
        let decision = select(&snap).unwrap();
        assert_eq!(decision.action, Action::Wait);
        assert_eq!(decision.event, "waiting for wave reset");
    }

    #[test]
    fn test_nearest_valuable_prefers_top_tier() {
        let snap = snapshot(
            player_at(372.0, 0.0),
            vec![
                resource(0, Rarity::Common, 340.0, 0.0),
                resource(1, Rarity::Secret, 200.0, 0.0),
                resource(2, Rarity::Secret, 300.0, 0.0),
            ],
            380.0,
        );
        let candidates: Vec<_> = snap.resources.iter().collect();
        let target = nearest_valuable(&snap.player.position, &candidates).unwrap();
        assert_eq!(target.index, 2);
        assert!(nearest_valuable(&snap.player.position, &[]).is_none());
    }

    #[test]
    fn test_nothing_valid_returns_none() {
        let snap = snapshot(
            player_at(100.0, 0.0),
            vec![resource(0, Rarity::Secret, 360.0, 0.0)],
            -500.0,
        );
        assert!(select(&snap).is_none());
    }
}
