//! Chat completion service used by the remote-model strategy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ServiceError;
use crate::models::config::RemoteConfig;

/// A single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// System instruction.
    pub system: String,
    /// User instruction, including the document text.
    pub user: String,
    /// Ask the service for a JSON object response.
    pub json_response: bool,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A text-in, text-out completion service.
///
/// One call is one round trip; implementations must not retry.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send the request and return the raw text payload.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError>;
}

/// OpenAI-compatible chat completion client.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client for the configured endpoint.
    pub fn new(api_key: impl Into<String>, config: &RemoteConfig) -> Result<Self, ServiceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    t: &'static str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

fn request_body(request: &CompletionRequest) -> Req<'_> {
    Req {
        model: &request.model,
        messages: vec![
            Msg {
                role: "system",
                content: &request.system,
            },
            Msg {
                role: "user",
                content: &request.user,
            },
        ],
        temperature: request.temperature,
        response_format: request.json_response.then_some(ResponseFormat { t: "json_object" }),
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!("Requesting completion from {} with model {}", self.base_url, request.model);

        let resp = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .bearer_auth(&self.api_key)
            .json(&request_body(request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        completion_content(&body)
    }
}

/// Pull the first choice's text out of a completion envelope.
fn completion_content(body: &str) -> Result<String, ServiceError> {
    let out: Resp =
        serde_json::from_str(body).map_err(|e| ServiceError::Envelope(e.to_string()))?;
    let choice = out.choices.into_iter().next().ok_or(ServiceError::NoChoices)?;
    Ok(choice.message.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(json_response: bool) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            system: "sys".to_string(),
            user: "usr".to_string(),
            json_response,
            temperature: 0.0,
        }
    }

    #[test]
    fn test_request_body_json_mode() {
        let body = serde_json::to_value(request_body(&request(true))).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "usr"}
                ],
                "temperature": 0.0,
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn test_request_body_plain_mode() {
        let body = serde_json::to_value(request_body(&request(false))).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = RemoteConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..RemoteConfig::default()
        };
        let client = OpenAiClient::new("sk-test", &config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_response_shape() {
        let out: Resp = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{}"}}]}"#,
        )
        .unwrap();
        assert_eq!(out.choices[0].message.content.as_deref(), Some("{}"));
    }

    #[test]
    fn test_completion_content() {
        let content = completion_content(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{\"transactions\": []}"}}]}"#,
        )
        .unwrap();
        assert_eq!(content, r#"{"transactions": []}"#);
    }

    #[test]
    fn test_unexpected_envelope() {
        let err = completion_content("<html>gateway</html>").unwrap_err();
        assert!(matches!(err, ServiceError::Envelope(_)));
        assert!(err.is_malformed_reply());

        let err = completion_content(r#"{"id": "cmpl-1"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Envelope(_)));

        let err = completion_content(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, ServiceError::NoChoices));
        assert!(err.is_malformed_reply());
    }
}
