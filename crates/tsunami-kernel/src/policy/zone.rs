//! Zone-Restricted ("farmer"): low-variance income near base.
//!
//! The risk posture lives entirely in the filters (venture boundary and
//! minimum rarity) and a wide margin. There is no wait state and no post-wave
//! mode.

use super::{approach, nearest, valid_candidates};
use crate::action::Decision;
use crate::config::GameConstants;
use crate::safety::{reachable, SafetyModel};
use crate::snapshot::{ResourceEntity, WorldSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRestricted {
    /// Multiplier on the zone margin unit
    pub safety_modifier: f64,
    /// Only resources with x above this are considered
    pub venture_limit_x: f64,
    /// Minimum rarity priority index; 0 accepts everything
    pub min_rarity_priority: usize,
}

impl ZoneRestricted {
    pub fn margin(&self, constants: &GameConstants) -> f64 {
        self.safety_modifier * constants.zone_margin_unit
    }

    /// Return leg beats the hazard with the wide zone margin.
    pub fn is_safe(
        &self,
        snapshot: &WorldSnapshot,
        target: &ResourceEntity,
        constants: &GameConstants,
        model: &SafetyModel,
    ) -> bool {
        let player = &snapshot.player;
        let needed = model.ticks_to_return(&target.position, &player.base_center, player.speed_level);
        let until = model.ticks_until_hazard(&player.base_center, snapshot.hazard.x);
        reachable(needed, until, self.margin(constants))
    }

    fn in_zone(&self, r: &ResourceEntity) -> bool {
        r.position.x > self.venture_limit_x
            && (self.min_rarity_priority == 0 || r.rarity.priority() >= self.min_rarity_priority)
    }

    pub(super) fn select_action(
        &self,
        snapshot: &WorldSnapshot,
        constants: &GameConstants,
        model: &SafetyModel,
    ) -> Option<Decision> {
        let player = &snapshot.player;
        let valid: Vec<_> = valid_candidates(snapshot, constants)
            .into_iter()
            .filter(|r| self.in_zone(r))
            .collect();

        let safe: Vec<_> = valid
            .iter()
            .copied()
            .filter(|r| self.is_safe(snapshot, r, constants, model))
            .collect();

        let (pool, risky) = if safe.is_empty() {
            (&valid, true)
        } else {
            (&safe, false)
        };

        let target = nearest(&player.position, pool)?;
        let decision = approach(
            &player.position,
            target,
            constants,
            format!("farming {} in zone", target.rarity),
        );
        Some(if risky { decision.risky() } else { decision })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::action::Action;
    use crate::rarity::Rarity;

    fn farmer(venture_limit_x: f64, min_rarity_priority: usize) -> ZoneRestricted {
        ZoneRestricted {
            safety_modifier: 2.0,
            venture_limit_x,
            min_rarity_priority,
        }
    }

    fn select(policy: &ZoneRestricted, snapshot: &WorldSnapshot) -> Option<Decision> {
        let c = GameConstants::default();
        policy.select_action(snapshot, &c, &SafetyModel::new(&c))
    }

    #[test]
    fn test_never_crosses_venture_limit() {
        let snap = snapshot(
            player_at(120.0, 0.0),
            vec![
                resource(0, Rarity::Secret, 95.0, 0.0),
                resource(1, Rarity::Common, 250.0, 0.0),
            ],
            -500.0,
        );
        let decision = select(&farmer(100.0, 0), &snap).unwrap();
        assert_eq!(decision.action, Action::move_to(snap.resources[1].position));
        assert_eq!(decision.event, "farming Common in zone");
    }

    #[test]
    fn test_min_rarity_counts_from_secret() {
        // Priority >= 1 drops Secret and keeps everything below it
        let snap = snapshot(
            player_at(300.0, 0.0),
            vec![
                resource(0, Rarity::Secret, 299.0, 0.0),
                resource(1, Rarity::Uncommon, 280.0, 0.0),
            ],
            -500.0,
        );
        let decision = select(&farmer(-50.0, 1), &snap).unwrap();
        assert_eq!(decision.rarity, Some(Rarity::Uncommon));
    }

    #[test]
    fn test_unsafe_pool_used_when_nothing_safe() {
        // Margin 6 ticks exceeds the 1.5 ticks left before the front hits base
        let snap = snapshot(
            player_at(300.0, 0.0),
            vec![
                resource(0, Rarity::Rare, 250.0, 0.0),
                resource(1, Rarity::Epic, 200.0, 0.0),
            ],
            300.0,
        );
        let decision = select(&farmer(100.0, 0), &snap).unwrap();
        assert!(decision.risky);
        assert_eq!(decision.rarity, Some(Rarity::Rare));
    }

    #[test]
    fn test_nothing_in_zone_returns_none() {
        let snap = snapshot(
            player_at(300.0, 0.0),
            vec![resource(0, Rarity::Legendary, 50.0, 0.0)],
            -500.0,
        );
        assert!(select(&farmer(200.0, 0), &snap).is_none());
    }
}
