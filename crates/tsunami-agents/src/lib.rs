//! Tsunami Agents: runs a roster of bots against a live game.
//!
//! Each agent gets its own [`runner::AgentRunner`] task wrapping a
//! [`tsunami_kernel::AgentMachine`]. The game is reached through the
//! [`dispatcher::Dispatcher`] and [`dispatcher::Notifier`] seams, implemented
//! over HTTP by [`game_client::GameClient`].

pub mod chat_log;
pub mod dispatcher;
pub mod game_client;
pub mod notifier;
pub mod roster;
pub mod runner;

pub use chat_log::{ChatEntry, ChatLog, SharedChatLog};
pub use dispatcher::{Dispatcher, Notifier};
pub use game_client::{DispatchError, GameClient};
pub use roster::{Roster, RosterEntry};
pub use runner::{AgentRunner, RunSummary, RunnerConfig};
