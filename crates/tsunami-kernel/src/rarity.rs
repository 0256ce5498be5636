//! Resource rarity and its derivation from zone tags or colors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resource rarity, ordered from most to least valuable.
///
/// The derived `Ord` follows declaration order, so `Secret < Common` and the
/// minimum of a set is its highest-priority member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Secret,
    Legendary,
    Epic,
    Rare,
    Uncommon,
    Common,
}

/// Per-channel tolerance for color matching.
const COLOR_TOLERANCE: f64 = 0.01;

/// Colors the server paints each rarity with. Common has no entry.
const COLOR_TABLE: [(Rarity, [f64; 3]); 5] = [
    (Rarity::Secret, [1.0, 1.0, 1.0]),
    (Rarity::Legendary, [1.0, 1.0, 0.196_078_43]),
    (Rarity::Epic, [1.0, 0.588_235_3, 0.196_078_43]),
    (Rarity::Rare, [0.705_882_4, 0.392_156_87, 1.0]),
    (Rarity::Uncommon, [0.392_156_87, 0.588_235_3, 1.0]),
];

impl Rarity {
    /// All rarities in priority order.
    pub const ALL: [Rarity; 6] = [
        Rarity::Secret,
        Rarity::Legendary,
        Rarity::Epic,
        Rarity::Rare,
        Rarity::Uncommon,
        Rarity::Common,
    ];

    /// Priority index: 0 for Secret up to 5 for Common.
    pub fn priority(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Secret => "Secret",
            Self::Legendary => "Legendary",
            Self::Epic => "Epic",
            Self::Rare => "Rare",
            Self::Uncommon => "Uncommon",
            Self::Common => "Common",
        }
    }

    /// Parse a zone tag. Tags are case-sensitive, as the server sends them.
    pub fn from_zone(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == tag)
    }

    /// Look up a color, defaulting to Common when nothing matches.
    pub fn from_color(color: &[f64]) -> Self {
        let [r, g, b] = match color {
            [r, g, b, ..] => [*r, *g, *b],
            _ => return Self::Common,
        };

        COLOR_TABLE
            .iter()
            .find(|(_, [tr, tg, tb])| {
                (r - tr).abs() < COLOR_TOLERANCE
                    && (g - tg).abs() < COLOR_TOLERANCE
                    && (b - tb).abs() < COLOR_TOLERANCE
            })
            .map(|(rarity, _)| *rarity)
            .unwrap_or(Self::Common)
    }

    /// Zone tag wins when it names a rarity; otherwise fall back to color.
    pub fn classify(zone: Option<&str>, color: &[f64]) -> Self {
        zone.and_then(Self::from_zone)
            .unwrap_or_else(|| Self::from_color(color))
    }

    /// Rarities worth celebrating in chat.
    pub fn is_notable(self) -> bool {
        self <= Self::Epic
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert_eq!(Rarity::Secret.priority(), 0);
        assert_eq!(Rarity::Common.priority(), 5);
        assert!(Rarity::Legendary < Rarity::Epic);
        assert_eq!(Rarity::ALL.iter().min(), Some(&Rarity::Secret));
    }

    #[test]
    fn test_color_lookup_within_tolerance() {
        assert_eq!(Rarity::from_color(&[1.0, 1.0, 1.0]), Rarity::Secret);
        assert_eq!(Rarity::from_color(&[0.995, 1.0, 0.2]), Rarity::Legendary);
        assert_eq!(Rarity::from_color(&[1.0, 0.59, 0.19]), Rarity::Epic);
        assert_eq!(Rarity::from_color(&[0.7058824, 0.39215687, 1.0]), Rarity::Rare);
        assert_eq!(Rarity::from_color(&[0.39215687, 0.5882353, 1.0, 1.0]), Rarity::Uncommon);
    }

    #[test]
    fn test_color_lookup_defaults_to_common() {
        assert_eq!(Rarity::from_color(&[1.0, 1.0, 0.25]), Rarity::Common);
        assert_eq!(Rarity::from_color(&[1.0, 1.0]), Rarity::Common);
        assert_eq!(Rarity::from_color(&[]), Rarity::Common);
    }

    #[test]
    fn test_zone_tag_overrides_color() {
        assert_eq!(Rarity::classify(Some("Epic"), &[1.0, 1.0, 1.0]), Rarity::Epic);
        // Unknown tags fall through to the color table
        assert_eq!(Rarity::classify(Some("Spawn"), &[1.0, 1.0, 1.0]), Rarity::Secret);
        assert_eq!(Rarity::classify(None, &[0.1, 0.1, 0.1]), Rarity::Common);
    }
}
