use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::AiConfig;
use crate::mapping::Declaration;

/// Second chance for tokens the mapping engine leaves unresolved.
pub trait UnknownClassResolver {
    fn resolve_unknown(&mut self, token: &str) -> Result<Vec<Declaration>, AiError>;
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("failed to make request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no response from AI")]
    EmptyResponse,

    #[error("failed to parse AI response: {0}")]
    Parse(#[from] serde_json::Error),
}

const MAX_TOKENS: u32 = 200;
const SYSTEM_PROMPT: &str = "You are a CSS expert that converts Tailwind CSS classes to vanilla \
CSS properties. Always respond with valid JSON only.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct PropertyList {
    #[serde(default)]
    properties: Vec<PropertyEntry>,
}

#[derive(Debug, Deserialize)]
struct PropertyEntry {
    name: String,
    value: String,
}

/// OpenAI-compatible chat-completions client with a per-run cache.
///
/// Never fails from the caller's point of view: a missing key or a failed
/// request produces placeholder comments, which are cached like real answers.
#[derive(Debug)]
pub struct AiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    cache: HashMap<String, Vec<Declaration>>,
}

impl AiClient {
    pub fn new(config: &AiConfig, api_key: Option<String>) -> Result<Self, AiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            cache: HashMap::new(),
        })
    }

    /// Reads the key from the environment variable named in `config`.
    pub fn from_env(config: &AiConfig) -> Result<Self, AiError> {
        Self::new(config, std::env::var(&config.api_key_env).ok())
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn query(&self, api_key: &str, token: &str) -> Result<Vec<Declaration>, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt(token),
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse = serde_json::from_str(&body)?;
        let choice = response.choices.into_iter().next().ok_or(AiError::EmptyResponse)?;
        parse_properties(&choice.message.content)
    }
}

impl UnknownClassResolver for AiClient {
    fn resolve_unknown(&mut self, token: &str) -> Result<Vec<Declaration>, AiError> {
        if let Some(cached) = self.cache.get(token) {
            return Ok(cached.clone());
        }

        let declarations = match self.api_key.as_deref() {
            None => vec![
                Declaration::comment("Unknown Tailwind class", token),
                Declaration::comment("Add manual conversion", ""),
            ],
            Some(api_key) => match self.query(api_key, token) {
                Ok(declarations) => declarations,
                Err(err) => {
                    tracing::warn!("AI conversion of {} failed: {}", token, err);
                    vec![
                        Declaration::comment("AI conversion failed", token),
                        Declaration::comment("Error", err.to_string()),
                    ]
                }
            },
        };

        self.cache.insert(token.to_string(), declarations.clone());
        Ok(declarations)
    }
}

fn prompt(token: &str) -> String {
    format!(
        r#"Convert the Tailwind CSS class "{}" to vanilla CSS properties.

Return the result as a JSON object with this structure:
{{
  "properties": [
    {{"name": "css-property-name", "value": "css-value"}},
    {{"name": "another-property", "value": "another-value"}}
  ]
}}

Only return the JSON object, no other text."#,
        token
    )
}

/// Parses the model's answer, tolerating a fenced ```json block.
fn parse_properties(content: &str) -> Result<Vec<Declaration>, AiError> {
    let content = content.trim();
    let content = content.strip_prefix("```json").unwrap_or(content);
    let content = content.strip_suffix("```").unwrap_or(content).trim();
    let list: PropertyList = serde_json::from_str(content)?;
    Ok(list
        .properties
        .into_iter()
        .map(|entry| Declaration::new(entry.name, entry.value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{AiClient, UnknownClassResolver, parse_properties, prompt};
    use crate::config::AiConfig;
    use crate::mapping::Declaration;

    #[test]
    fn parses_fenced_json() {
        let content =
            "```json\n{\"properties\":[{\"name\":\"aspect-ratio\",\"value\":\"16 / 9\"}]}\n```";
        let parsed = parse_properties(content).expect("parse");
        assert_eq!(parsed, vec![Declaration::new("aspect-ratio", "16 / 9")]);
    }

    #[test]
    fn rejects_non_json_answers() {
        let err = parse_properties("aspect-ratio: 16/9").expect_err("not json");
        assert!(err.to_string().starts_with("failed to parse AI response"));
    }

    #[test]
    fn prompt_names_the_class() {
        assert!(prompt("aspect-video").contains("\"aspect-video\""));
    }

    #[test]
    fn placeholder_without_api_key_is_cached() {
        let mut client = AiClient::new(&AiConfig::default(), None).expect("client");
        let first = client.resolve_unknown("aspect-video").expect("placeholder");
        assert_eq!(
            first,
            vec![
                Declaration::new("/* Unknown Tailwind class */", "aspect-video"),
                Declaration::new("/* Add manual conversion */", ""),
            ]
        );
        assert_eq!(client.cache_len(), 1);
        let second = client.resolve_unknown("aspect-video").expect("cached");
        assert_eq!(first, second);
        assert_eq!(client.cache_len(), 1);
        client.clear_cache();
        assert_eq!(client.cache_len(), 0);
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let mut client =
            AiClient::new(&AiConfig::default(), Some(String::new())).expect("client");
        let result = client.resolve_unknown("line-clamp-2").expect("placeholder");
        assert_eq!(result[0].name, "/* Unknown Tailwind class */");
    }

    #[test]
    fn request_failure_becomes_placeholder() {
        let config = AiConfig {
            base_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            ..AiConfig::default()
        };
        let mut client = AiClient::new(&config, Some("test-key".to_string())).expect("client");
        let result = client.resolve_unknown("aspect-video").expect("placeholder");
        assert_eq!(result[0], Declaration::new("/* AI conversion failed */", "aspect-video"));
        assert_eq!(result[1].name, "/* Error */");
        assert_eq!(client.cache_len(), 1);
    }
}
