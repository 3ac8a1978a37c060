//! Remote classifier backed by an OpenAI-compatible chat completion endpoint.

use super::classifier::{Classification, Classifier, ClassifyError};
use super::prompt::member_classification_prompt;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Classifier that sends biographies to a chat completion API and parses
/// the model's JSON reply.
pub struct RemoteClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl RemoteClassifier {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Models often wrap JSON replies in markdown fences; strip them before
    /// parsing.
    fn strip_markdown_fences(text: &str) -> &str {
        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
    }

    fn parse_reply(content: &str) -> Result<Classification, ClassifyError> {
        let body = Self::strip_markdown_fences(content);
        let classification: Classification = serde_json::from_str(body).map_err(|e| {
            ClassifyError::InvalidResponse(format!("reply is not the expected JSON object: {}", e))
        })?;
        classification.validate()?;
        Ok(classification)
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &str {
        "remote"
    }

    fn is_offline(&self) -> bool {
        false
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: member_classification_prompt(text),
            }],
            temperature: 0.3,
        };

        debug!(model = %self.model, bio_len = text.len(), "Sending classification request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout
                } else {
                    ClassifyError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ClassifyError::InvalidResponse(format!("failed to parse completion response: {}", e))
        })?;

        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| {
                ClassifyError::InvalidResponse("completion response has no choices".to_string())
            })?;

        Self::parse_reply(content)
    }
}

// Chat completion API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(
            RemoteClassifier::strip_markdown_fences("```json\n{\"a\": 1}\n```"),
            "{\"a\": 1}"
        );
        assert_eq!(
            RemoteClassifier::strip_markdown_fences("```\n{\"a\": 1}\n```"),
            "{\"a\": 1}"
        );
        assert_eq!(
            RemoteClassifier::strip_markdown_fences("{\"a\": 1}"),
            "{\"a\": 1}"
        );
    }

    #[test]
    fn test_parse_reply_accepts_fenced_json() {
        let reply = r#"```json
{"skills": ["mentoring", "Community Building"], "persona": "Mentor Material", "confidence_score": 0.9}
```"#;
        let classification = RemoteClassifier::parse_reply(reply).unwrap();
        assert_eq!(classification.persona, "Mentor Material");
        assert_eq!(classification.skills.len(), 2);
        assert_eq!(classification.confidence_score, 0.9);
    }

    #[test]
    fn test_parse_reply_missing_skills_defaults_empty() {
        let reply = r#"{"persona": "Observer", "confidence_score": 0.2}"#;
        let classification = RemoteClassifier::parse_reply(reply).unwrap();
        assert!(classification.skills.is_empty());
    }

    #[test]
    fn test_parse_reply_rejects_non_json() {
        let result = RemoteClassifier::parse_reply("I could not classify this member.");
        assert!(matches!(result, Err(ClassifyError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_reply_rejects_contract_violations() {
        let missing_persona = r#"{"skills": [], "confidence_score": 0.5}"#;
        assert!(RemoteClassifier::parse_reply(missing_persona).is_err());

        let bad_score = r#"{"skills": [], "persona": "Observer", "confidence_score": 1.5}"#;
        assert!(RemoteClassifier::parse_reply(bad_score).is_err());

        let non_string_skills = r#"{"skills": [1, 2], "persona": "Observer", "confidence_score": 0.5}"#;
        assert!(RemoteClassifier::parse_reply(non_string_skills).is_err());
    }
}
