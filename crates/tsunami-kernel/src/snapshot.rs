//! World snapshot: the immutable, typed view one decision is made from.
//!
//! A snapshot is rebuilt from every observation and dropped at the end of the
//! cycle. Missing attributes are resolved to defaults here so the policies
//! never deal with absent data.

use tracing::warn;

use crate::config::GameConstants;
use crate::geometry::Position;
use crate::observation::{EntityView, Observation};
use crate::rarity::Rarity;

/// A collectible resource in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntity {
    /// Index in the observation's entity list
    pub index: usize,
    pub name: String,
    pub position: Position,
    pub rarity: Rarity,
    /// False once the entity has fallen below the void threshold
    pub alive: bool,
}

impl ResourceEntity {
    pub fn in_base_zone(&self, constants: &GameConstants) -> bool {
        self.position.x > constants.zones.base_zone_x
    }
}

/// Leading edge of the hazard: the minimum x across active wave entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardFront {
    pub x: f64,
}

impl HazardFront {
    /// The front as seen when no wave entity exists: far away.
    pub fn absent(constants: &GameConstants) -> Self {
        Self {
            x: constants.hazard.absent_x,
        }
    }

    /// Minimum x of the given wave positions, or the absent sentinel.
    pub fn from_waves(xs: impl IntoIterator<Item = f64>, constants: &GameConstants) -> Self {
        xs.into_iter()
            .reduce(f64::min)
            .map(|x| Self { x })
            .unwrap_or_else(|| Self::absent(constants))
    }

    pub fn is_active(&self, constants: &GameConstants) -> bool {
        self.x > constants.hazard.active_above_x
    }

    /// True once the front has swept past the deposit point.
    pub fn has_passed(&self, point: &Position) -> bool {
        self.x > point.x
    }
}

/// A resource already placed on the player's base.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedResource {
    pub index: usize,
    pub value: f64,
}

/// The observing player's state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Position,
    pub money: f64,
    pub speed_level: u32,
    pub carried: u32,
    pub capacity: u32,
    pub next_speed_cost: f64,
    pub base_center: Position,
    pub placed: Vec<PlacedResource>,
    pub base_capacity: usize,
}

impl PlayerState {
    pub fn is_full(&self) -> bool {
        self.carried >= self.capacity
    }

    pub fn distance_to_base(&self) -> f64 {
        self.position.distance(&self.base_center)
    }

    /// Lowest-value placed resource; the first one wins ties.
    pub fn lowest_value_placed(&self) -> Option<&PlacedResource> {
        self.placed
            .iter()
            .reduce(|lowest, p| if p.value < lowest.value { p } else { lowest })
    }

    pub fn base_is_full(&self) -> bool {
        self.placed.len() >= self.base_capacity
    }
}

/// Everything a single decision needs.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub player: PlayerState,
    pub resources: Vec<ResourceEntity>,
    pub hazard: HazardFront,
}

impl WorldSnapshot {
    /// Build a snapshot from a raw observation.
    ///
    /// A malformed placed-resources string is logged and read as an empty base.
    pub fn from_observation(obs: &Observation, constants: &GameConstants) -> Self {
        let attrs = &obs.player.attributes;
        let defaults = &constants.player_defaults;

        let placed = match attrs.placed_brainrots.as_ref().map(|field| field.decode()) {
            Some(Ok(list)) => list
                .into_iter()
                .map(|p| PlacedResource {
                    index: p.index,
                    value: p.value,
                })
                .collect(),
            Some(Err(e)) => {
                warn!(error = %e, "Malformed placed-resources payload, treating base as empty");
                Vec::new()
            }
            None => Vec::new(),
        };

        let player = PlayerState {
            position: obs.player.position,
            money: attrs.money.unwrap_or(0.0),
            speed_level: to_count(attrs.speed_level.unwrap_or(1.0)),
            carried: to_count(attrs.carried_count.unwrap_or(0.0)),
            capacity: attrs
                .carry_capacity
                .map(to_count)
                .unwrap_or(defaults.carry_capacity),
            next_speed_cost: attrs.next_speed_cost.unwrap_or(defaults.next_speed_cost),
            base_center: Position::new(
                attrs.base_center_x.unwrap_or(defaults.base_center_x),
                defaults.base_center_y,
                attrs.base_center_z.unwrap_or(defaults.base_center_z),
            ),
            placed,
            base_capacity: attrs
                .base_max_brainrots
                .map(|v| to_count(v) as usize)
                .unwrap_or(defaults.base_capacity),
        };

        let entities = &obs.world.entities;

        let resources = entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.attributes.is_brainrot)
            .map(|(index, e)| resource_from_entity(index, e, constants))
            .collect();

        let hazard = HazardFront::from_waves(
            entities
                .iter()
                .filter(|e| e.name.starts_with(&constants.hazard.wave_prefix))
                .map(|e| e.position.x),
            constants,
        );

        Self {
            player,
            resources,
            hazard,
        }
    }
}

fn resource_from_entity(index: usize, e: &EntityView, constants: &GameConstants) -> ResourceEntity {
    ResourceEntity {
        index,
        name: e.name.clone(),
        position: e.position,
        rarity: Rarity::classify(e.zone_tag(), &e.color),
        alive: e.position.y > constants.zones.void_y,
    }
}

/// Integer-like attribute; negative values saturate to zero.
fn to_count(v: f64) -> u32 {
    v.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WorldSnapshot {
        let obs: Observation = serde_json::from_str(json).unwrap();
        WorldSnapshot::from_observation(&obs, &GameConstants::default())
    }

    #[test]
    fn test_missing_attributes_use_defaults() {
        let snap = parse("{}");
        assert_eq!(snap.player.capacity, 1);
        assert_eq!(snap.player.speed_level, 1);
        assert_eq!(snap.player.next_speed_cost, 999_999.0);
        assert_eq!(snap.player.base_center, Position::new(375.0, 0.25, 0.0));
        assert_eq!(snap.player.base_capacity, 10);
        assert!(snap.resources.is_empty());
        assert_eq!(snap.hazard.x, -500.0);
    }

    #[test]
    fn test_entities_split_into_resources_and_waves() {
        let snap = parse(
            r#"{
                "player": {"position": [10, 2, 0], "attributes": {
                    "CarriedCount": 1, "CarryCapacity": 3, "Money": 120.5,
                    "SpeedLevel": 4.0, "BaseCenterX": 400, "BaseCenterZ": 12,
                    "PlacedBrainrots": "[{\"index\": 0, \"value\": 50}, {\"index\": 1, \"value\": 5}]"
                }},
                "world": {"entities": [
                    {"name": "TsunamiWave_1", "position": [-120, 0, 0]},
                    {"name": "Brainrot", "position": [50, 1, 3], "color": [1, 1, 1],
                     "attributes": {"IsBrainrot": true}},
                    {"name": "TsunamiWave_2", "position": [-80, 0, 40]},
                    {"name": "Brainrot", "position": [60, -150, 3],
                     "attributes": {"IsBrainrot": true, "Zone": "Rare"}},
                    {"name": "Tree", "position": [1, 1, 1]}
                ]}
            }"#,
        );

        assert_eq!(snap.player.carried, 1);
        assert_eq!(snap.player.capacity, 3);
        assert_eq!(snap.player.speed_level, 4);
        assert_eq!(snap.player.base_center, Position::new(400.0, 0.25, 12.0));
        assert_eq!(snap.player.lowest_value_placed().map(|p| p.index), Some(1));

        assert_eq!(snap.hazard.x, -120.0);

        assert_eq!(snap.resources.len(), 2);
        assert_eq!(snap.resources[0].index, 1);
        assert_eq!(snap.resources[0].rarity, Rarity::Secret);
        assert!(snap.resources[0].alive);
        assert_eq!(snap.resources[1].index, 3);
        assert_eq!(snap.resources[1].rarity, Rarity::Rare);
        assert!(!snap.resources[1].alive);
    }

    #[test]
    fn test_hazard_activity() {
        let c = GameConstants::default();
        assert!(!HazardFront::absent(&c).is_active(&c));
        assert!(HazardFront { x: -399.0 }.is_active(&c));
        assert!(HazardFront { x: 380.0 }.has_passed(&Position::new(375.0, 0.0, 0.0)));
    }

    #[test]
    fn test_malformed_placed_list_reads_as_empty_base() {
        let snap = parse(
            r#"{
                "player": {"attributes": {"PlacedBrainrots": "not json", "CarriedCount": 1}},
                "world": {"entities": [
                    {"name": "Brainrot", "position": [100, 1, 0],
                     "attributes": {"IsBrainrot": true, "Zone": "Epic"}}
                ]}
            }"#,
        );
        assert!(snap.player.placed.is_empty());
        assert_eq!(snap.player.lowest_value_placed(), None);
        assert_eq!(snap.player.carried, 1);
        assert_eq!(snap.resources.len(), 1);
    }
}
