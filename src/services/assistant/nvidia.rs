use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{AssistantProvider, Message};

const SYSTEM_PROMPT: &str = r#"You are a helpful, concise, and polite AI travel concierge for India.
You MUST provide accurate, realistic recommendations for food, attractions, and experiences in the cities the guest asks about. DO NOT invent places.

When a guest asks for recommendations, reply with friendly text AND append this structured tag at the end:
[RECOMMENDATIONS: [{"name": "Exact Place Name", "city": "City", "category": "Culture/Food/Nature/Shopping", "image_url": "URL", "detail": "One factual sentence.", "price": "Free/Range"}]]

When a guest asks to book a taxi or a hotel, or you are mid-way through gathering booking details, append:
[BOOKING_STATE: {"type": "taxi", "pickup": "[Location]", "dropoff": "[Destination]", "time": "[Time]", "status": "gathering"}]

When a guest asks for a trip plan or mentions a budget and day count, append instead:
[ITINERARY_PLAN: {"destination": "City, State", "days": 3, "budget_total": 15000, "budget_currency": "INR", "generated_at": "ISO_DATETIME", "days_plan": [{"day": 1, "theme": "Arrival & Heritage", "items": [{"time": "09:00", "activity": "Visit Charminar", "place": "Charminar, Hyderabad", "cost": 25, "category": "Culture", "tip": "Go early to avoid crowds"}]}]}]

BOOKING RULES:
1. If the guest did not state a pickup and a live geolocation line is present below, set pickup EXACTLY to "Current Location (Live GPS)" and do not ask for it.
2. If the guest did not state a time, default it to "Now".
3. Set status to "ready" only when pickup, dropoff and time are all filled. Ask for whatever is missing.
4. Always append city and state/country to the dropoff so it can be geocoded.

ITINERARY RULES: 3-5 activities per day with time, place, cost, category and a practical tip; the plan must fit the stated budget.

Only emit ONE tag per reply, as single-line JSON at the very end of the message."#;

pub struct NvidiaProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl NvidiaProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AssistantProvider for NvidiaProvider {
    async fn reply(
        &self,
        messages: &[Message],
        user_location: Option<&str>,
    ) -> anyhow::Result<String> {
        let system = match user_location {
            Some(loc) => format!("{SYSTEM_PROMPT}\n\n[SYSTEM DATA] Live User Geolocation: {loc}"),
            None => SYSTEM_PROMPT.to_string(),
        };

        let mut chat_messages = vec![json!({
            "role": "system",
            "content": system,
        })];

        for msg in messages {
            // The UI stores the assistant side under the role "bot".
            let role = if msg.role == "bot" { "assistant" } else { msg.role.as_str() };
            chat_messages.push(json!({
                "role": role,
                "content": msg.content,
            }));
        }

        let body = json!({
            "model": self.model,
            "messages": chat_messages,
            "temperature": 0.5,
            "max_tokens": 1024,
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call assistant API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse assistant response")?;

        if !status.is_success() {
            anyhow::bail!("assistant API error ({}): {}", status, data);
        }

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing content in assistant response"))
    }
}
