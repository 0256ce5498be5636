//! Configuration types for the decision engine.
//!
//! `GameConstants` holds the tuned numbers tied to the current map geometry
//! and game balance. `AgentConfig` is the per-agent surface populated from a
//! roster file. Both are loaded from TOML/JSON at runtime and fall back to the
//! values the bots were tuned against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Tuned constants shared by every agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConstants {
    /// Player movement model
    pub speed: SpeedConfig,

    /// Hazard front (tsunami) model
    pub hazard: HazardConfig,

    /// Zone boundaries and interaction radii
    pub zones: ZoneConfig,

    /// Speed shop location and purchase rule
    pub shop: ShopConfig,

    /// Stuck detection thresholds
    pub stuck: StuckConfig,

    /// Fallbacks for player attributes the server omits
    pub player_defaults: PlayerDefaults,

    /// Money at which Aggressive-Safe agents exploit the post-wave window
    pub aggressive_money_threshold: f64,

    /// Zone-Restricted margin is `safety_modifier * zone_margin_unit` ticks
    pub zone_margin_unit: f64,
}

/// Player speed: `base + (level - 1) * per_level` units per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedConfig {
    pub base: f64,
    pub per_level: f64,
    /// Highest purchasable speed level
    pub max_level: u32,
}

/// Hazard front configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardConfig {
    /// Units the front advances per tick
    pub speed: f64,
    /// Entity name prefix identifying hazard-wave entities
    pub wave_prefix: String,
    /// Front position assumed when no wave entity is observed
    pub absent_x: f64,
    /// The front is active only above this x
    pub active_above_x: f64,
}

/// Map zones and interaction distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Anything with x above this is inside the base zone
    pub base_zone_x: f64,
    /// Entities at or below this y have fallen into the void
    pub void_y: f64,
    /// Distance to base center that counts as "at base"
    pub near_base_radius: f64,
    /// Distance at which a resource can be collected
    pub interaction_radius: f64,
}

/// Speed shop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    pub position: Position,
    /// Distance at which `BuySpeed` is accepted
    pub radius: f64,
    /// Buy when `money >= next_cost * upgrade_threshold`
    pub upgrade_threshold: f64,
}

/// Stuck detection: `cycles` consecutive cycles moving less than `epsilon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StuckConfig {
    pub epsilon: f64,
    pub cycles: u32,
}

/// Values used when the observation omits a player attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDefaults {
    pub base_center_x: f64,
    pub base_center_y: f64,
    pub base_center_z: f64,
    pub carry_capacity: u32,
    pub next_speed_cost: f64,
    pub base_capacity: usize,
}

impl Default for GameConstants {
    fn default() -> Self {
        Self {
            speed: SpeedConfig {
                base: 16.0,
                per_level: 5.5,
                max_level: 10,
            },
            hazard: HazardConfig {
                speed: 50.0,
                wave_prefix: "TsunamiWave".to_string(),
                absent_x: -500.0,
                active_above_x: -400.0,
            },
            zones: ZoneConfig {
                base_zone_x: 350.0,
                void_y: -100.0,
                near_base_radius: 20.0,
                interaction_radius: 5.0,
            },
            shop: ShopConfig {
                position: Position::new(490.0, 2.5, 84.0),
                radius: 20.0,
                upgrade_threshold: 1.0,
            },
            stuck: StuckConfig {
                epsilon: 1.0,
                cycles: 5,
            },
            player_defaults: PlayerDefaults {
                base_center_x: 375.0,
                base_center_y: 0.25,
                base_center_z: 0.0,
                carry_capacity: 1,
                next_speed_cost: 999_999.0,
                base_capacity: 10,
            },
            aggressive_money_threshold: 2500.0,
            zone_margin_unit: 3.0,
        }
    }
}

/// The three targeting archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Archetype {
    /// Risk-averse, rarity-first, farthest reachable ("tryhard")
    AggressiveSafe,
    /// Highest rarity regardless of danger ("gambler")
    RiskSeeking,
    /// Stays near base inside a venture boundary ("farmer")
    ZoneRestricted,
}

impl Archetype {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AggressiveSafe => "tryhard",
            Self::RiskSeeking => "gambler",
            Self::ZoneRestricted => "farmer",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Archetype {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tryhard" | "aggressive-safe" | "aggressive_safe" => Ok(Self::AggressiveSafe),
            "gambler" | "risk-seeking" | "risk_seeking" => Ok(Self::RiskSeeking),
            "farmer" | "zone-restricted" | "zone_restricted" => Ok(Self::ZoneRestricted),
            _ => anyhow::bail!(
                "Unknown archetype: {}. Valid: tryhard, gambler, farmer",
                s
            ),
        }
    }
}

impl TryFrom<String> for Archetype {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Archetype> for String {
    fn from(value: Archetype) -> Self {
        value.name().to_string()
    }
}

/// Per-agent configuration. Immutable for the agent's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,

    pub archetype: Archetype,

    /// Scales the archetype's safety margin (tiered, flat or zone multiple)
    pub safety_modifier: f64,

    /// Policy cycles between chat notifications
    #[serde(default = "default_chat_interval")]
    pub chat_interval: u32,

    /// Zone-Restricted only: resources must lie beyond this x
    #[serde(default = "default_venture_limit")]
    pub venture_limit_x: f64,

    /// Zone-Restricted only: minimum rarity priority index (0 accepts all)
    #[serde(default)]
    pub min_rarity_priority: usize,
}

fn default_chat_interval() -> u32 {
    10
}

fn default_venture_limit() -> f64 {
    100.0
}

impl AgentConfig {
    /// Config with archetype defaults for the zone tuning fields.
    pub fn new(name: impl Into<String>, archetype: Archetype, safety_modifier: f64) -> Self {
        Self {
            name: name.into(),
            archetype,
            safety_modifier,
            chat_interval: default_chat_interval(),
            venture_limit_x: default_venture_limit(),
            min_rarity_priority: 0,
        }
    }
}
