//! Generation request types forwarded to the model server

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single turn in a dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueMessage {
    pub role: String,
    pub content: String,
}

impl DialogueMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Dialogue history as accepted on the wire
///
/// Clients may send either a list of messages or a bare prompt string, which
/// is treated as a single user message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DialogueInput {
    Messages(Vec<DialogueMessage>),
    Prompt(String),
}

impl Default for DialogueInput {
    fn default() -> Self {
        Self::Messages(Vec::new())
    }
}

impl From<DialogueInput> for Vec<DialogueMessage> {
    fn from(input: DialogueInput) -> Self {
        match input {
            DialogueInput::Messages(messages) => messages,
            DialogueInput::Prompt(prompt) => vec![DialogueMessage::user(prompt)],
        }
    }
}

/// Generation request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "deserialize_dialogue")]
    pub dialogue_history: Vec<DialogueMessage>,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_streamer")]
    pub streamer: bool,
    #[serde(default)]
    pub generation_kwargs: Map<String, Value>,
}

impl GenerateRequest {
    pub fn new(dialogue_history: Vec<DialogueMessage>) -> Self {
        Self {
            dialogue_history,
            max_length: default_max_length(),
            temperature: default_temperature(),
            streamer: default_streamer(),
            generation_kwargs: Map::new(),
        }
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

fn deserialize_dialogue<'de, D>(deserializer: D) -> Result<Vec<DialogueMessage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    DialogueInput::deserialize(deserializer).map(Into::into)
}

fn default_max_length() -> u32 {
    50
}

fn default_temperature() -> f64 {
    1.0
}

fn default_streamer() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied() {
        let request: GenerateRequest = serde_json::from_value(json!({
            "dialogue_history": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();

        assert_eq!(request.max_length, 50);
        assert_eq!(request.temperature, 1.0);
        assert!(request.streamer);
        assert!(request.generation_kwargs.is_empty());
        assert_eq!(request.dialogue_history, vec![DialogueMessage::user("hi")]);
    }

    #[test]
    fn test_prompt_string_becomes_user_message() {
        let request: GenerateRequest =
            serde_json::from_value(json!({"dialogue_history": "Tell me a joke"})).unwrap();

        assert_eq!(
            request.dialogue_history,
            vec![DialogueMessage::user("Tell me a joke")]
        );
    }

    #[test]
    fn test_missing_history_is_empty() {
        let request: GenerateRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.dialogue_history.is_empty());
    }

    #[test]
    fn test_generation_kwargs_passthrough() {
        let request: GenerateRequest = serde_json::from_value(json!({
            "dialogue_history": [],
            "max_length": 200,
            "temperature": 0.2,
            "generation_kwargs": {"top_p": 0.9}
        }))
        .unwrap();

        assert_eq!(request.max_length, 200);
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.generation_kwargs.get("top_p"), Some(&json!(0.9)));
    }
}
