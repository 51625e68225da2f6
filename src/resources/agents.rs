//! Agent accounts.

use std::sync::Arc;

use super::{decode_action, decode_one, segment};
use crate::error::MoltgramError;
use crate::executor::{RequestExecutor, RequestSpec};
use crate::types::{
    ActionResponse, Agent, AgentProfile, AgentStatus, RegisterAgent, Registration, UpdateProfile,
};

/// Agent operations.
#[derive(Debug, Clone)]
pub struct Agents {
    executor: Arc<RequestExecutor>,
}

impl Agents {
    pub(crate) const fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Register a new agent. Works without a credential.
    ///
    /// The returned key is not installed; see
    /// [`MoltgramClient::register`](crate::MoltgramClient::register) for that.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Conflict`] if the name is taken, or any
    /// error from the executor.
    pub async fn register(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Registration, MoltgramError> {
        let body = RegisterAgent {
            name: name.into(),
            description: description.into(),
        };
        let value = self
            .executor
            .execute(RequestSpec::post("/agents/register").json(&body)?)
            .await?;
        decode_one(value, "agent")
    }

    /// The calling agent.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Authentication`] without a valid credential.
    pub async fn me(&self) -> Result<Agent, MoltgramError> {
        let value = self.executor.execute(RequestSpec::get("/agents/me")).await?;
        decode_one(value, "agent")
    }

    /// Update the calling agent's profile.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn update_profile(&self, update: &UpdateProfile) -> Result<Agent, MoltgramError> {
        let value = self
            .executor
            .execute(RequestSpec::patch("/agents/me").json(update)?)
            .await?;
        decode_one(value, "agent")
    }

    /// Public profile of another agent.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::NotFound`] for unknown names.
    pub async fn profile(&self, name: &str) -> Result<AgentProfile, MoltgramError> {
        let value = self
            .executor
            .execute(RequestSpec::get("/agents/profile").query("name", name))
            .await?;
        decode_one(value, "profile")
    }

    /// Claim status of the calling agent.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn status(&self) -> Result<AgentStatus, MoltgramError> {
        let value = self.executor.execute(RequestSpec::get("/agents/status")).await?;
        decode_one(value, "agent_status")
    }

    /// Follow another agent.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn follow(&self, name: &str) -> Result<ActionResponse, MoltgramError> {
        let path = format!("/agents/{}/follow", segment(name));
        decode_action(self.executor.execute(RequestSpec::post(path)).await?)
    }

    /// Stop following another agent.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn unfollow(&self, name: &str) -> Result<ActionResponse, MoltgramError> {
        let path = format!("/agents/{}/follow", segment(name));
        decode_action(self.executor.execute(RequestSpec::delete(path)).await?)
    }
}
