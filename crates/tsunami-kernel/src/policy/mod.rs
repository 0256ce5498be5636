//! Targeting policies: turn a snapshot into the next action.
//!
//! Three variants share one capability, [`Policy::select_action`], and the
//! [`SafetyModel`] cost model. They differ only in how they filter
//! candidates, how much slack they leave before the hazard, and what they do
//! when nothing is safe.
//!
//! Policies are pure: the same snapshot always yields the same decision.

mod aggressive;
mod risk_seeking;
mod zone;

pub use aggressive::{speed_tier_margin, AggressiveSafe};
pub use risk_seeking::RiskSeeking;
pub use zone::ZoneRestricted;

use crate::action::{Action, Decision};
use crate::config::{AgentConfig, Archetype, GameConstants};
use crate::geometry::Position;
use crate::rarity::Rarity;
use crate::safety::SafetyModel;
use crate::snapshot::{ResourceEntity, WorldSnapshot};

/// The active targeting policy of an agent.
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    AggressiveSafe(AggressiveSafe),
    RiskSeeking(RiskSeeking),
    ZoneRestricted(ZoneRestricted),
}

impl Policy {
    /// Build the policy named by the agent's archetype.
    pub fn for_agent(config: &AgentConfig) -> Self {
        match config.archetype {
            Archetype::AggressiveSafe => Self::AggressiveSafe(AggressiveSafe {
                safety_modifier: config.safety_modifier,
            }),
            Archetype::RiskSeeking => Self::RiskSeeking(RiskSeeking {
                safety_modifier: config.safety_modifier,
            }),
            Archetype::ZoneRestricted => Self::ZoneRestricted(ZoneRestricted {
                safety_modifier: config.safety_modifier,
                venture_limit_x: config.venture_limit_x,
                min_rarity_priority: config.min_rarity_priority,
            }),
        }
    }

    /// Choose the next action, or `None` when there is nothing worth doing
    /// (the caller then heads back to base).
    pub fn select_action(
        &self,
        snapshot: &WorldSnapshot,
        constants: &GameConstants,
    ) -> Option<Decision> {
        let model = SafetyModel::new(constants);
        match self {
            Self::AggressiveSafe(p) => p.select_action(snapshot, constants, &model),
            Self::RiskSeeking(p) => p.select_action(snapshot, constants, &model),
            Self::ZoneRestricted(p) => p.select_action(snapshot, constants, &model),
        }
    }

    pub fn archetype(&self) -> Archetype {
        match self {
            Self::AggressiveSafe(_) => Archetype::AggressiveSafe,
            Self::RiskSeeking(_) => Archetype::RiskSeeking,
            Self::ZoneRestricted(_) => Archetype::ZoneRestricted,
        }
    }
}

/// Alive resources outside the base zone.
fn valid_candidates<'a>(
    snapshot: &'a WorldSnapshot,
    constants: &GameConstants,
) -> Vec<&'a ResourceEntity> {
    snapshot
        .resources
        .iter()
        .filter(|r| r.alive && !r.in_base_zone(constants))
        .collect()
}

/// Closest candidate to `from`; the first one wins ties.
fn nearest<'a>(from: &Position, candidates: &[&'a ResourceEntity]) -> Option<&'a ResourceEntity> {
    candidates.iter().copied().reduce(|best, r| {
        if from.distance(&r.position) < from.distance(&best.position) {
            r
        } else {
            best
        }
    })
}

/// Farthest candidate from `from`; the first one wins ties.
fn farthest<'a>(from: &Position, candidates: &[&'a ResourceEntity]) -> Option<&'a ResourceEntity> {
    candidates.iter().copied().reduce(|best, r| {
        if from.distance(&r.position) > from.distance(&best.position) {
            r
        } else {
            best
        }
    })
}

/// The highest-priority rarity present and the candidates holding it.
fn top_tier<'a>(candidates: &[&'a ResourceEntity]) -> Option<(Rarity, Vec<&'a ResourceEntity>)> {
    let best = candidates.iter().map(|r| r.rarity).min()?;
    let group = candidates
        .iter()
        .copied()
        .filter(|r| r.rarity == best)
        .collect();
    Some((best, group))
}

/// Collect when within reach of the target, otherwise walk to it.
fn approach(
    player: &Position,
    target: &ResourceEntity,
    constants: &GameConstants,
    event: impl Into<String>,
) -> Decision {
    if player.distance(&target.position) < constants.zones.interaction_radius {
        Decision::new(
            Action::Collect,
            Some(target.rarity),
            format!("collected {}", target.rarity),
        )
    } else {
        Decision::new(Action::move_to(target.position), Some(target.rarity), event)
    }
}
