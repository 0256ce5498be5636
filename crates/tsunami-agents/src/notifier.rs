//! Fire-and-forget chat notifications.
//!
//! A notification is a detached task whose result is discarded. Chat is a
//! lossy side channel: a failure is logged at debug and never reaches the
//! agent loop.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use tsunami_kernel::{Decision, PlayerState};

use crate::chat_log::SharedChatLog;
use crate::dispatcher::Notifier;

/// Entries read back from the shared log before posting.
pub const CONTEXT_WINDOW: usize = 5;

/// One-line summary of what an agent is doing.
pub fn compose_message(decision: Option<&Decision>, player: &PlayerState) -> String {
    let event = decision.map_or("heading home", |d| d.event.as_str());
    let mut text = format!(
        "{} (${:.0}, speed {}, carrying {}/{})",
        event, player.money, player.speed_level, player.carried, player.capacity
    );
    if decision.is_some_and(|d| d.risky) {
        text.push_str(" - risky!");
    }
    text
}

/// Whether `text` repeats one of the recent lines in the log.
pub fn is_repeat(chat_log: &SharedChatLog, text: &str) -> bool {
    chat_log
        .recent(CONTEXT_WINDOW)
        .iter()
        .any(|entry| entry.message == text)
}

/// Post `text` for `agent` in the background. On success the line is
/// appended to the shared chat log.
pub fn spawn_notification(
    notifier: Arc<dyn Notifier>,
    chat_log: SharedChatLog,
    agent: String,
    agent_key: String,
    text: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match notifier.notify(&agent_key, &text).await {
            Ok(()) => {
                debug!(agent = %agent, message = %text, "Chat sent");
                chat_log.add(agent, text);
            }
            Err(e) => debug!(agent = %agent, error = %e, "Chat failed"),
        }
    })
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use tsunami_kernel::{Action, Position, Rarity};

    use super::*;
    use crate::chat_log::ChatLog;

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn notify(&self, _agent_key: &str, _text: &str) -> Result<()> {
            bail!("chat endpoint down")
        }
    }

    struct Accepting;

    #[async_trait]
    impl Notifier for Accepting {
        async fn notify(&self, _agent_key: &str, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    fn player() -> PlayerState {
        PlayerState {
            position: Position::new(0.0, 0.0, 0.0),
            money: 1234.4,
            speed_level: 3,
            carried: 1,
            capacity: 2,
            next_speed_cost: 500.0,
            base_center: Position::new(375.0, 0.25, 0.0),
            placed: Vec::new(),
            base_capacity: 10,
        }
    }

    #[test]
    fn test_compose_message() {
        let decision = Decision::new(Action::Collect, Some(Rarity::Epic), "collected Epic");
        assert_eq!(
            compose_message(Some(&decision), &player()),
            "collected Epic ($1234, speed 3, carrying 1/2)"
        );
        let risky = Decision::new(Action::Collect, None, "YOLO").risky();
        assert!(compose_message(Some(&risky), &player()).ends_with("risky!"));
        assert!(compose_message(None, &player()).starts_with("heading home"));
    }

    #[test]
    fn test_repeat_detection_uses_recent_window() {
        let log = ChatLog::shared();
        log.add("Ninja", "old line");
        for i in 0..CONTEXT_WINDOW {
            log.add("Shroud", format!("filler {}", i));
        }
        assert!(!is_repeat(&log, "old line"));
        assert!(is_repeat(&log, "filler 4"));
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let log = ChatLog::shared();
        let handle = spawn_notification(
            Arc::new(Failing),
            Arc::clone(&log),
            "xQc".into(),
            "key".into(),
            "hello".into(),
        );
        handle.await.unwrap();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_success_is_logged() {
        let log = ChatLog::shared();
        spawn_notification(
            Arc::new(Accepting),
            Arc::clone(&log),
            "xQc".into(),
            "key".into(),
            "hello".into(),
        )
        .await
        .unwrap();
        assert_eq!(log.recent(1)[0].agent, "xQc");
    }
}
