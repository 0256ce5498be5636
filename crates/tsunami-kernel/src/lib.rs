//! Tsunami Kernel: decision logic for autonomous collector agents
//!
//! Each agent observes the world, builds a typed snapshot, and a per-agent
//! state machine picks the next action: stuck recovery, deposit, speed
//! upgrades, and finally one of three targeting policies that trade reward
//! against the time left before the hazard front reaches base.
//!
//! Everything here is synchronous and free of I/O.

pub mod action;
pub mod config;
pub mod geometry;
pub mod machine;
pub mod observation;
pub mod policy;
pub mod rarity;
pub mod safety;
pub mod snapshot;

pub use action::{Action, Decision};
pub use config::{AgentConfig, Archetype, GameConstants};
pub use geometry::Position;
pub use machine::{AgentMachine, Rule, Step};
pub use observation::Observation;
pub use policy::Policy;
pub use rarity::Rarity;
pub use safety::SafetyModel;
pub use snapshot::{HazardFront, PlacedResource, PlayerState, ResourceEntity, WorldSnapshot};
