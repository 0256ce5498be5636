//! Collaborator seams between an agent loop and the outside world.

use anyhow::Result;
use async_trait::async_trait;

use tsunami_kernel::{Action, Observation};

/// Reads the world and sends inputs on behalf of one agent key.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn observe(&self, agent_key: &str) -> Result<Observation>;

    /// Send one action. `Action::Wait` is never passed here.
    async fn send_action(&self, agent_key: &str, action: &Action) -> Result<()>;
}

/// Posts a chat line for an agent.
///
/// Calls run detached from the agent loop; failures are logged and dropped.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, agent_key: &str, text: &str) -> Result<()>;
}
