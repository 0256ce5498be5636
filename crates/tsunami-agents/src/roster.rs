//! Agent roster: who plays, with which archetype, under which key.
//!
//! Loaded from TOML. A roster file may also override game constants; a
//! nested table replaces that group as a whole:
//!
//! ```toml
//! [constants]
//! aggressive_money_threshold = 4000.0
//!
//! [constants.stuck]
//! epsilon = 0.5
//! cycles = 8
//!
//! [runner]
//! cycle_delay = 400
//!
//! [[agents]]
//! name = "Ninja"
//! archetype = "tryhard"
//! safety_modifier = 1.1
//! chat_interval = 8
//! api_key = "..."
//! ```
//!
//! Without a file the built-in roster of eight personas is used.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use tsunami_kernel::{AgentConfig, Archetype, GameConstants};

use crate::runner::RunnerConfig;

/// Prefix of the per-agent key variable, e.g. `TSUNAMI_KEY_NINJA`.
pub const KEY_ENV_PREFIX: &str = "TSUNAMI_KEY_";

/// One agent in the roster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub config: AgentConfig,

    /// Bearer key; falls back to the environment when absent
    #[serde(default)]
    pub api_key: Option<String>,
}

impl RosterEntry {
    fn new(config: AgentConfig) -> Self {
        Self {
            config,
            api_key: None,
        }
    }

    /// Environment variable consulted when no key is configured.
    pub fn key_env_var(&self) -> String {
        let suffix: String = self
            .config
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", KEY_ENV_PREFIX, suffix)
    }

    /// The configured key, else the one from the environment.
    pub fn resolve_key(&self) -> Option<String> {
        self.resolve_key_with(|var| std::env::var(var).ok())
    }

    pub fn resolve_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| lookup(&self.key_env_var()))
            .filter(|k| !k.trim().is_empty())
    }
}

/// The full roster plus any constant overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub constants: GameConstants,

    /// Loop timing; durations in milliseconds
    #[serde(default)]
    pub runner: RunnerConfig,

    pub agents: Vec<RosterEntry>,
}

impl Default for Roster {
    fn default() -> Self {
        let zone = |name: &str, modifier: f64, chat: u32, venture: f64, min: usize| AgentConfig {
            chat_interval: chat,
            venture_limit_x: venture,
            min_rarity_priority: min,
            ..AgentConfig::new(name, Archetype::ZoneRestricted, modifier)
        };
        let with_chat = |name: &str, archetype: Archetype, modifier: f64, chat: u32| AgentConfig {
            chat_interval: chat,
            ..AgentConfig::new(name, archetype, modifier)
        };

        let agents = vec![
            with_chat("Ninja", Archetype::AggressiveSafe, 1.1, 8),
            with_chat("Shroud", Archetype::AggressiveSafe, 1.0, 14),
            with_chat("xQc", Archetype::RiskSeeking, 0.5, 4),
            with_chat("TimTheTatman", Archetype::RiskSeeking, 0.4, 6),
            with_chat("HasanAbi", Archetype::RiskSeeking, 0.65, 7),
            zone("Pokimane", 2.0, 10, 100.0, 0),
            zone("Ludwig", 1.8, 9, -50.0, 1),
            zone("Valkyrae", 3.0, 5, 200.0, 0),
        ];

        Self {
            constants: GameConstants::default(),
            runner: RunnerConfig::default(),
            agents: agents.into_iter().map(RosterEntry::new).collect(),
        }
    }
}

impl Roster {
    pub fn from_toml(text: &str) -> Result<Self> {
        let roster: Self = toml::from_str(text).context("Failed to parse roster")?;
        roster.validate()?;
        Ok(roster)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid roster {}", path.display()))
    }

    /// The file when given, otherwise the built-in roster.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn find(&self, name: &str) -> Option<&RosterEntry> {
        self.agents
            .iter()
            .find(|a| a.config.name.eq_ignore_ascii_case(name))
    }

    fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            bail!("Roster has no agents");
        }
        let mut seen = HashSet::new();
        for entry in &self.agents {
            let name = &entry.config.name;
            if name.trim().is_empty() {
                bail!("Agent with empty name");
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                bail!("Duplicate agent name: {}", name);
            }
            if entry.config.safety_modifier < 0.0 {
                bail!("Agent {}: safety_modifier must be >= 0", name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster() {
        let roster = Roster::default();
        assert_eq!(roster.agents.len(), 8);
        let ludwig = roster.find("ludwig").unwrap();
        assert_eq!(ludwig.config.archetype, Archetype::ZoneRestricted);
        assert_eq!(ludwig.config.venture_limit_x, -50.0);
        assert_eq!(ludwig.config.min_rarity_priority, 1);
        assert_eq!(roster.find("xQc").unwrap().config.chat_interval, 4);
        assert!(roster.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let roster = Roster::from_toml(
            r#"
            [constants]
            aggressive_money_threshold = 4000.0

            [constants.stuck]
            epsilon = 0.5
            cycles = 8

            [runner]
            cycle_delay = 400

            [[agents]]
            name = "Ninja"
            archetype = "aggressive-safe"
            safety_modifier = 1.0
            api_key = "abc"

            [[agents]]
            name = "Valkyrae"
            archetype = "farmer"
            safety_modifier = 3.0
            venture_limit_x = 200.0
            "#,
        )
        .unwrap();

        assert_eq!(roster.constants.aggressive_money_threshold, 4000.0);
        assert_eq!(roster.constants.stuck.cycles, 8);
        assert_eq!(roster.constants.hazard.speed, 50.0);
        assert_eq!(roster.runner.cycle_delay.as_millis(), 400);
        assert_eq!(roster.runner.chat_probability, 0.75);
        assert_eq!(roster.agents[0].config.archetype, Archetype::AggressiveSafe);
        assert_eq!(roster.agents[0].config.chat_interval, 10);
        assert_eq!(roster.agents[0].api_key.as_deref(), Some("abc"));
        assert_eq!(roster.agents[1].config.venture_limit_x, 200.0);
    }

    #[test]
    fn test_rejects_bad_rosters() {
        assert!(Roster::from_toml("agents = []").is_err());
        let dup = r#"
            [[agents]]
            name = "a"
            archetype = "gambler"
            safety_modifier = 0.5
            [[agents]]
            name = "A"
            archetype = "farmer"
            safety_modifier = 2.0
        "#;
        assert!(Roster::from_toml(dup).is_err());
        let unknown = r#"
            [[agents]]
            name = "a"
            archetype = "camper"
            safety_modifier = 1.0
        "#;
        assert!(Roster::from_toml(unknown).is_err());
    }

    #[test]
    fn test_key_resolution() {
        let roster = Roster::default();
        let entry = roster.find("TimTheTatman").unwrap();
        assert_eq!(entry.key_env_var(), "TSUNAMI_KEY_TIMTHETATMAN");

        let env = |var: &str| (var == "TSUNAMI_KEY_TIMTHETATMAN").then(|| "from-env".to_string());
        assert_eq!(entry.resolve_key_with(env).as_deref(), Some("from-env"));
        assert_eq!(entry.resolve_key_with(|_| None), None);

        let configured = RosterEntry {
            api_key: Some("inline".to_string()),
            ..entry.clone()
        };
        assert_eq!(configured.resolve_key_with(env).as_deref(), Some("inline"));

        let blank = RosterEntry {
            api_key: Some("  ".to_string()),
            ..entry.clone()
        };
        assert_eq!(blank.resolve_key_with(|_| None), None);
    }
}
