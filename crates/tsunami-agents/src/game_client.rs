//! HTTP client for the game server.
//!
//! Endpoints, all under `{api_base}/games/{game_id}/` and authenticated with
//! the agent's bearer key:
//! - `GET observe`: world state for the calling agent
//! - `POST input`: one action, `{type, data?}`
//! - `POST chat`: `{content}`
//! - `POST join` / `POST leave`

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use tsunami_kernel::{Action, Observation};

use crate::dispatcher::{Dispatcher, Notifier};

/// Timeout for observe and input calls.
pub const GAME_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for chat and leave calls.
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a game request failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    content: &'a str,
}

/// Game server client shared by all agents.
#[derive(Clone)]
pub struct GameClient {
    client: reqwest::Client,
    api_base: String,
    game_id: String,
}

impl GameClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_base` - API root, e.g. "http://localhost:8080/api/v1"
    /// * `game_id` - The game all agents join
    pub fn new(api_base: &str, game_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            game_id: game_id.to_string(),
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/games/{}/{}", self.api_base, self.game_id, endpoint)
    }

    async fn check(
        endpoint: &'static str,
        result: reqwest::Result<reqwest::Response>,
    ) -> Result<reqwest::Response, DispatchError> {
        let response = result.map_err(|source| DispatchError::Transport { endpoint, source })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                endpoint,
                status,
                body,
            });
        }
        Ok(response)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        agent_key: &str,
        endpoint: &'static str,
        body: Option<&B>,
        timeout: Duration,
    ) -> Result<(), DispatchError> {
        let mut request = self
            .client
            .post(self.url(endpoint))
            .bearer_auth(agent_key)
            .timeout(timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::check(endpoint, request.send().await).await?;
        Ok(())
    }

    pub async fn fetch_observation(&self, agent_key: &str) -> Result<Observation, DispatchError> {
        let response = self
            .client
            .get(self.url("observe"))
            .bearer_auth(agent_key)
            .timeout(GAME_TIMEOUT)
            .send()
            .await;
        Self::check("observe", response)
            .await?
            .json()
            .await
            .map_err(|source| DispatchError::Decode {
                endpoint: "observe",
                source,
            })
    }

    pub async fn input(&self, agent_key: &str, action: &Action) -> Result<(), DispatchError> {
        self.post(agent_key, "input", Some(action), GAME_TIMEOUT).await
    }

    pub async fn chat(&self, agent_key: &str, content: &str) -> Result<(), DispatchError> {
        self.post(agent_key, "chat", Some(&ChatRequest { content }), SHORT_TIMEOUT)
            .await
    }

    pub async fn join(&self, agent_key: &str) -> Result<(), DispatchError> {
        self.post::<()>(agent_key, "join", None, GAME_TIMEOUT).await
    }

    pub async fn leave(&self, agent_key: &str) -> Result<(), DispatchError> {
        self.post::<()>(agent_key, "leave", None, SHORT_TIMEOUT).await
    }
}

#[async_trait]
impl Dispatcher for GameClient {
    async fn observe(&self, agent_key: &str) -> Result<Observation> {
        Ok(self.fetch_observation(agent_key).await?)
    }

    async fn send_action(&self, agent_key: &str, action: &Action) -> Result<()> {
        Ok(self.input(agent_key, action).await?)
    }
}

#[async_trait]
impl Notifier for GameClient {
    async fn notify(&self, agent_key: &str, text: &str) -> Result<()> {
        Ok(self.chat(agent_key, text).await?)
    }
}
