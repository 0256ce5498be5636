//! Risk-Seeking ("gambler"): chase the most valuable tier, check safety once,
//! and go anyway if the check fails.

use super::{approach, nearest, top_tier, valid_candidates};
use crate::action::Decision;
use crate::config::GameConstants;
use crate::safety::{reachable, SafetyModel};
use crate::snapshot::{ResourceEntity, WorldSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub struct RiskSeeking {
    /// Flat margin in ticks; small for this archetype
    pub safety_modifier: f64,
}

impl RiskSeeking {
    /// Loose check: only the return leg has to beat the hazard.
    pub fn is_safe_enough(
        &self,
        snapshot: &WorldSnapshot,
        target: &ResourceEntity,
        model: &SafetyModel,
    ) -> bool {
        let player = &snapshot.player;
        let needed = model.ticks_to_return(&target.position, &player.base_center, player.speed_level);
        let until = model.ticks_until_hazard(&player.base_center, snapshot.hazard.x);
        reachable(needed, until, self.safety_modifier)
    }

    pub(super) fn select_action(
        &self,
        snapshot: &WorldSnapshot,
        constants: &GameConstants,
        model: &SafetyModel,
    ) -> Option<Decision> {
        let player = &snapshot.player;
        let valid = valid_candidates(snapshot, constants);

        let (rarity, group) = top_tier(&valid)?;
        let target = nearest(&player.position, &group)?;

        if self.is_safe_enough(snapshot, target, model) {
            return Some(approach(
                &player.position,
                target,
                constants,
                format!("chasing {}", rarity),
            ));
        }

        if let Some(fallback) = nearest(&player.position, &valid)
            .filter(|f| self.is_safe_enough(snapshot, f, model))
        {
            return Some(approach(
                &player.position,
                fallback,
                constants,
                "gambler fallback - nearest",
            ));
        }

        Some(
            approach(
                &player.position,
                target,
                constants,
                "YOLO gambler - ignoring danger",
            )
            .risky(),
        )
    }
}
