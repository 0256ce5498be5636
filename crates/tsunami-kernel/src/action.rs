//! Actions and the decision telemetry that accompanies them.

use serde::Serialize;

use crate::geometry::Position;
use crate::rarity::Rarity;

/// One game input.
///
/// Serializes to the server's `{type, data?}` form. `Wait` means "send
/// nothing this cycle" and is never put on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Action {
    MoveTo { position: Position },
    Collect,
    Deposit,
    BuySpeed,
    Destroy { index: usize },
    #[serde(skip)]
    Wait,
}

impl Action {
    pub fn move_to(position: Position) -> Self {
        Self::MoveTo { position }
    }

    /// Whether this action results in a request to the server.
    pub fn is_dispatched(&self) -> bool {
        !matches!(self, Self::Wait)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "MoveTo",
            Self::Collect => "Collect",
            Self::Deposit => "Deposit",
            Self::BuySpeed => "BuySpeed",
            Self::Destroy { .. } => "Destroy",
            Self::Wait => "Wait",
        }
    }
}

/// A policy's choice plus what it was aiming at.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    /// Rarity of the targeted resource, if any
    pub rarity: Option<Rarity>,
    /// Short description for logs and chat
    pub event: String,
    /// Set when the policy knowingly picked an unsafe target
    pub risky: bool,
}

impl Decision {
    pub fn new(action: Action, rarity: Option<Rarity>, event: impl Into<String>) -> Self {
        Self {
            action,
            rarity,
            event: event.into(),
            risky: false,
        }
    }

    pub fn wait(event: impl Into<String>) -> Self {
        Self::new(Action::Wait, None, event)
    }

    pub fn risky(mut self) -> Self {
        self.risky = true;
        self
    }

    /// A Collect of a Secret, Legendary or Epic resource.
    pub fn is_notable_collect(&self) -> bool {
        self.action == Action::Collect && self.rarity.is_some_and(Rarity::is_notable)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_wire_encoding() {
        let move_to = Action::move_to(Position::new(490.0, 2.5, 84.0));
        assert_eq!(
            serde_json::to_value(&move_to).unwrap(),
            json!({"type": "MoveTo", "data": {"position": [490.0, 2.5, 84.0]}})
        );
        assert_eq!(
            serde_json::to_value(Action::Destroy { index: 3 }).unwrap(),
            json!({"type": "Destroy", "data": {"index": 3}})
        );
        assert_eq!(
            serde_json::to_value(Action::Collect).unwrap(),
            json!({"type": "Collect"})
        );
    }

    #[test]
    fn test_wait_is_not_dispatched() {
        assert!(!Action::Wait.is_dispatched());
        assert!(serde_json::to_value(Action::Wait).is_err());
        assert!(Action::BuySpeed.is_dispatched());
    }

    #[test]
    fn test_notable_collect() {
        let epic = Decision::new(Action::Collect, Some(Rarity::Epic), "collected Epic");
        assert!(epic.is_notable_collect());

        let rare = Decision::new(Action::Collect, Some(Rarity::Rare), "collected Rare");
        assert!(!rare.is_notable_collect());

        let moving = Decision::new(
            Action::move_to(Position::default()),
            Some(Rarity::Secret),
            "targeting Secret",
        );
        assert!(!moving.is_notable_collect());
    }
}
