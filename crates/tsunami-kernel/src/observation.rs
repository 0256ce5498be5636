//! Raw observation payload as returned by the game's observe endpoint.
//!
//! Shape: `{ player: { position, attributes }, world: { entities: [...] } }`.
//! Every field is optional on the wire; missing numbers fall back to the
//! [`PlayerDefaults`](crate::config::PlayerDefaults) when the snapshot is built.
//! Numbers are kept as `f64` here because the server sends integers and floats
//! interchangeably.

use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Top-level observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    pub player: PlayerView,
    pub world: WorldView,
}

/// The observing player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerView {
    pub position: Position,
    pub attributes: PlayerAttributes,
}

/// Player attributes, keyed the way the server names them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PlayerAttributes {
    pub carried_count: Option<f64>,
    pub carry_capacity: Option<f64>,
    pub money: Option<f64>,
    pub speed_level: Option<f64>,
    pub next_speed_cost: Option<f64>,
    pub base_center_x: Option<f64>,
    pub base_center_z: Option<f64>,
    pub placed_brainrots: Option<PlacedField>,
    pub base_max_brainrots: Option<f64>,
}

/// The placed-resources list arrives either as a JSON array or as a string
/// containing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlacedField {
    List(Vec<PlacedView>),
    Encoded(String),
}

impl PlacedField {
    /// Decode into a list. An empty string means nothing is placed.
    pub fn decode(&self) -> anyhow::Result<Vec<PlacedView>> {
        match self {
            Self::List(list) => Ok(list.clone()),
            Self::Encoded(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Self::Encoded(raw) => serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Malformed PlacedBrainrots payload: {}", e)),
        }
    }
}

/// A resource sitting on the player's base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedView {
    pub index: usize,
    pub value: f64,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Everything else the player can see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldView {
    pub entities: Vec<EntityView>,
}

/// A world entity: resources, hazard waves, scenery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityView {
    pub name: String,
    pub position: Position,
    pub color: Vec<f64>,
    #[serde(rename = "Zone")]
    pub zone: Option<String>,
    pub attributes: EntityAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAttributes {
    #[serde(rename = "IsBrainrot")]
    pub is_brainrot: bool,
    #[serde(rename = "Zone")]
    pub zone: Option<String>,
}

impl EntityView {
    /// Zone tag, preferring the attribute over the top-level field.
    pub fn zone_tag(&self) -> Option<&str> {
        self.attributes
            .zone
            .as_deref()
            .filter(|z| !z.is_empty())
            .or(self.zone.as_deref())
    }
}
