//! Per-agent observe → decide → act loop.
//!
//! One [`AgentRunner`] per agent, each on its own tokio task. The loop only
//! ends on the stop signal: failed calls are logged, backed off, and retried.
//! Chat notifications are spawned detached and never awaited.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use tsunami_kernel::{Action, AgentConfig, AgentMachine, Decision, GameConstants, Rule, WorldSnapshot};

use crate::chat_log::SharedChatLog;
use crate::dispatcher::{Dispatcher, Notifier};
use crate::notifier::{compose_message, is_repeat, spawn_notification};

/// Loop timing and chat tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Pause between cycles
    #[serde(with = "millis")]
    pub cycle_delay: Duration,
    /// Pause after a failed cycle
    #[serde(with = "millis")]
    pub error_backoff: Duration,
    /// Pause after a stuck recovery move
    #[serde(with = "millis")]
    pub unstick_pause: Duration,
    /// Pause between Destroy and the following Deposit
    #[serde(with = "millis")]
    pub destroy_pause: Duration,
    /// Chance a due notification is actually sent
    pub chat_probability: f64,
    /// Emit a progress line every N cycles
    pub log_every: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cycle_delay: Duration::from_millis(500),
            error_backoff: Duration::from_secs(1),
            unstick_pause: Duration::from_secs(1),
            destroy_pause: Duration::from_millis(300),
            chat_probability: 0.75,
            log_every: 10,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Counts policy cycles between chat lines.
#[derive(Debug, Clone)]
pub struct ChatCadence {
    interval: u32,
    counter: u32,
}

impl ChatCadence {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            counter: 0,
        }
    }

    /// Record one policy cycle. Returns true when a notification is due.
    ///
    /// A notable collect makes it due right away.
    pub fn tick(&mut self, decision: Option<&Decision>) -> bool {
        self.counter += 1;
        if decision.is_some_and(Decision::is_notable_collect) {
            self.counter = self.counter.max(self.interval);
        }
        self.counter >= self.interval
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }
}

/// What a finished loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub errors: u64,
    pub notifications: u64,
}

/// Drives one agent until the stop signal fires.
pub struct AgentRunner {
    name: String,
    key: String,
    machine: AgentMachine,
    constants: GameConstants,
    dispatcher: Arc<dyn Dispatcher>,
    notifier: Arc<dyn Notifier>,
    chat_log: SharedChatLog,
    stop: watch::Receiver<bool>,
    config: RunnerConfig,
    cadence: ChatCadence,
    rng: StdRng,
}

impl AgentRunner {
    pub fn new(
        agent: AgentConfig,
        key: String,
        constants: GameConstants,
        dispatcher: Arc<dyn Dispatcher>,
        notifier: Arc<dyn Notifier>,
        chat_log: SharedChatLog,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let cadence = ChatCadence::new(agent.chat_interval);
        Self {
            name: agent.name.clone(),
            key,
            machine: AgentMachine::new(agent, constants.clone()),
            constants,
            dispatcher,
            notifier,
            chat_log,
            stop,
            config: RunnerConfig::default(),
            cadence,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the chat roll sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn stopped(&self) -> bool {
        *self.stop.borrow()
    }

    /// Sleep unless stopped first. Returns false when the loop should end.
    async fn pause(&mut self, duration: Duration) -> bool {
        let changed = tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            changed = self.stop.changed() => changed,
        };
        changed.is_ok() && !self.stopped()
    }

    pub async fn run(mut self) -> RunSummary {
        info!(
            agent = %self.name,
            archetype = %self.machine.config().archetype,
            safety = self.machine.config().safety_modifier,
            "Agent started"
        );

        let mut summary = RunSummary::default();
        while !self.stopped() {
            summary.cycles += 1;

            let pause = match self.cycle(&mut summary).await {
                Ok(pause) => pause,
                Err(e) => {
                    summary.errors += 1;
                    warn!(
                        agent = %self.name,
                        cycle = summary.cycles,
                        error = %format!("{:#}", e),
                        "Cycle failed, backing off"
                    );
                    self.config.error_backoff
                }
            };

            if self.config.log_every > 0 && summary.cycles % self.config.log_every == 0 {
                info!(
                    agent = %self.name,
                    cycles = summary.cycles,
                    errors = summary.errors,
                    chats = summary.notifications,
                    "Progress"
                );
            }

            if !self.pause(pause).await {
                break;
            }
        }

        info!(
            agent = %self.name,
            cycles = summary.cycles,
            errors = summary.errors,
            "Agent stopped"
        );
        summary
    }

    /// One observe → decide → act pass. Returns how long to wait before the
    /// next one.
    async fn cycle(&mut self, summary: &mut RunSummary) -> Result<Duration> {
        let observation = self
            .dispatcher
            .observe(&self.key)
            .await
            .context("observe failed")?;
        let snapshot = WorldSnapshot::from_observation(&observation, &self.constants);
        let step = self.machine.step(&snapshot);

        debug!(
            agent = %self.name,
            rule = ?step.rule,
            actions = ?step.actions.iter().map(Action::kind).collect::<Vec<_>>(),
            event = step.decision.as_ref().map(|d| d.event.as_str()),
            hazard_x = snapshot.hazard.x,
            "Step"
        );

        for action in &step.actions {
            self.dispatcher
                .send_action(&self.key, action)
                .await
                .with_context(|| format!("{} failed", action.kind()))?;
            if matches!(action, Action::Destroy { .. }) {
                tokio::time::sleep(self.config.destroy_pause).await;
            }
        }

        match step.rule {
            Rule::Unstick => return Ok(self.config.unstick_pause),
            Rule::Target => {
                if self.maybe_chat(step.decision.as_ref(), &snapshot) {
                    summary.notifications += 1;
                }
            }
            Rule::Deposit | Rule::Upgrade => {}
        }

        Ok(self.config.cycle_delay)
    }

    /// Advance the chat cadence and spawn a notification when due.
    fn maybe_chat(&mut self, decision: Option<&Decision>, snapshot: &WorldSnapshot) -> bool {
        if !self.cadence.tick(decision) {
            return false;
        }
        if self.rng.random::<f64>() >= self.config.chat_probability {
            return false;
        }
        self.cadence.reset();

        let text = compose_message(decision, &snapshot.player);
        if is_repeat(&self.chat_log, &text) {
            debug!(agent = %self.name, message = %text, "Skipping repeated chat");
            return false;
        }

        spawn_notification(
            Arc::clone(&self.notifier),
            Arc::clone(&self.chat_log),
            self.name.clone(),
            self.key.clone(),
            text,
        );
        true
    }
}
