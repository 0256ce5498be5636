//! Per-agent state machine.
//!
//! Each cycle the runner hands in a fresh [`WorldSnapshot`]; the machine
//! applies the structural rules in a fixed order and only delegates to the
//! targeting policy when none of them fires:
//!
//! ```text
//! snapshot
//!   ├─ stuck for N cycles?        → MoveTo(base), reset counter
//!   ├─ carrying at capacity?      → [Destroy(lowest)], Deposit  | MoveTo(base)
//!   ├─ empty-handed, can afford?  → MoveTo(shop) | BuySpeed
//!   └─ policy.select_action       → decision | MoveTo(base)
//! ```
//!
//! The only state carried between cycles is the last position and the stuck
//! counter.

use tracing::debug;

use crate::action::{Action, Decision};
use crate::config::{AgentConfig, GameConstants};
use crate::geometry::Position;
use crate::policy::Policy;
use crate::snapshot::WorldSnapshot;

/// Which rule produced a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Stuck recovery overrode the cycle
    Unstick,
    /// Carrying at capacity: deposit or head home
    Deposit,
    /// Walking to or buying at the speed shop
    Upgrade,
    /// The targeting policy decided (possibly nothing, which means go home)
    Target,
}

/// The output of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub rule: Rule,
    /// Actions to dispatch, in order. Empty for a wait.
    pub actions: Vec<Action>,
    /// Policy decision when `rule == Rule::Target`
    pub decision: Option<Decision>,
}

impl Step {
    fn structural(rule: Rule, actions: Vec<Action>) -> Self {
        Self {
            rule,
            actions,
            decision: None,
        }
    }
}

/// State machine for one agent.
#[derive(Debug, Clone)]
pub struct AgentMachine {
    config: AgentConfig,
    policy: Policy,
    constants: GameConstants,
    last_position: Option<Position>,
    stuck_cycles: u32,
}

impl AgentMachine {
    pub fn new(config: AgentConfig, constants: GameConstants) -> Self {
        let policy = Policy::for_agent(&config);
        Self {
            config,
            policy,
            constants,
            last_position: None,
            stuck_cycles: 0,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn stuck_cycles(&self) -> u32 {
        self.stuck_cycles
    }

    /// Decide this cycle's actions.
    pub fn step(&mut self, snapshot: &WorldSnapshot) -> Step {
        let player = &snapshot.player;

        if self.track_stuck(player.position) {
            debug!(
                agent = %self.config.name,
                cycles = self.constants.stuck.cycles,
                "Stuck, aborting to base"
            );
            return Step::structural(Rule::Unstick, vec![Action::move_to(player.base_center)]);
        }

        if player.is_full() {
            return Step::structural(Rule::Deposit, self.deposit(snapshot));
        }

        if let Some(action) = self.upgrade(snapshot) {
            return Step::structural(Rule::Upgrade, vec![action]);
        }

        match self.policy.select_action(snapshot, &self.constants) {
            Some(decision) => {
                let actions = if decision.action.is_dispatched() {
                    vec![decision.action.clone()]
                } else {
                    Vec::new()
                };
                Step {
                    rule: Rule::Target,
                    actions,
                    decision: Some(decision),
                }
            }
            None => Step {
                rule: Rule::Target,
                actions: vec![Action::move_to(player.base_center)],
                decision: None,
            },
        }
    }

    /// Update the stuck counter. Returns true when recovery should fire.
    ///
    /// The last position is not refreshed on the recovery cycle itself.
    fn track_stuck(&mut self, position: Position) -> bool {
        let stuck = &self.constants.stuck;
        match self.last_position {
            Some(last) if position.distance(&last) < stuck.epsilon => {
                self.stuck_cycles += 1;
                if self.stuck_cycles >= stuck.cycles {
                    self.stuck_cycles = 0;
                    return true;
                }
            }
            _ => self.stuck_cycles = 0,
        }
        self.last_position = Some(position);
        false
    }

    fn deposit(&self, snapshot: &WorldSnapshot) -> Vec<Action> {
        let player = &snapshot.player;
        if player.distance_to_base() >= self.constants.zones.near_base_radius {
            return vec![Action::move_to(player.base_center)];
        }

        let mut actions = Vec::with_capacity(2);
        if player.base_is_full() {
            if let Some(lowest) = player.lowest_value_placed() {
                debug!(
                    agent = %self.config.name,
                    index = lowest.index,
                    value = lowest.value,
                    "Base full, destroying lowest-value resource"
                );
                actions.push(Action::Destroy {
                    index: lowest.index,
                });
            }
        }
        actions.push(Action::Deposit);
        actions
    }

    fn upgrade(&self, snapshot: &WorldSnapshot) -> Option<Action> {
        let player = &snapshot.player;
        let shop = &self.constants.shop;

        let affordable = player.next_speed_cost > 0.0
            && player.money >= player.next_speed_cost * shop.upgrade_threshold;
        if player.carried != 0 || !affordable || player.speed_level >= self.constants.speed.max_level
        {
            return None;
        }

        if player.position.distance(&shop.position) > shop.radius {
            Some(Action::move_to(shop.position))
        } else {
            Some(Action::BuySpeed)
        }
    }
}
