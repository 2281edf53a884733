use serde::{Deserialize, Serialize};

/// One turn of the persisted transcript. The assistant side uses the role
/// name `bot`; providers normalize it to `assistant` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}
