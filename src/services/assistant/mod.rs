pub mod nvidia;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// The remote travel-assistant model. Returns one free-form reply which may
/// embed directive blocks; `services::directives` turns it into typed state.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    async fn reply(
        &self,
        messages: &[Message],
        user_location: Option<&str>,
    ) -> anyhow::Result<String>;
}
