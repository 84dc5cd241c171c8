//! Groq LLM Provider
//!
//! Implementation of `LlmProvider` over Groq's OpenAI-compatible chat
//! completions API, with native function calling.

use std::collections::HashMap;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Groq's OpenAI-compatible endpoint
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Shown when no API key has been supplied
pub const MISSING_KEY_MESSAGE: &str = "Please add your Groq API key to continue.";

/// Groq provider configuration
#[derive(Clone)]
pub struct GroqConfig {
    /// Bearer credential
    pub api_key: String,

    /// API base URL (without the `/chat/completions` suffix)
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: GROQ_BASE_URL.into(),
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GroqConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key-value source (environment, test fixtures)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: lookup("GROQ_API_KEY").unwrap_or_default(),
            base_url: lookup("GROQ_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: lookup("GROQ_TIMEOUT_SECS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    /// Same settings with a different key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// The key must be present before anything talks to the model
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AgentError::Config(MISSING_KEY_MESSAGE.into()));
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Groq LLM provider
pub struct GroqProvider {
    client: reqwest::Client,
    config: GroqConfig,
}

impl GroqProvider {
    /// Create a provider; fails if the API key is missing
    pub fn new(config: GroqConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GroqConfig::from_env())
    }

    pub const fn config(&self) -> &GroqConfig {
        &self.config
    }

    /// Build the chat-completions request body
    fn build_request(
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<ChatRequest> {
        let mut wire = Vec::with_capacity(messages.len() + 1);

        if let Some(system) = &options.system_prompt {
            wire.push(WireMessage::text(Role::System, system.clone()));
        }

        for message in messages {
            wire.push(Self::convert_message(message)?);
        }

        let tools: Vec<WireTool> = tools
            .iter()
            .map(|schema| WireTool {
                kind: "function".into(),
                function: WireFunctionDef {
                    name: schema.name.clone(),
                    description: schema.description.clone(),
                    parameters: schema.parameters_json(),
                },
            })
            .collect();

        Ok(ChatRequest {
            model: options.model.clone(),
            messages: wire,
            tool_choice: (!tools.is_empty()).then(|| "auto".to_string()),
            tools,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stop: options.stop_sequences.clone(),
        })
    }

    /// Convert an agent message to the wire format
    fn convert_message(message: &Message) -> Result<WireMessage> {
        let mut wire = WireMessage::text(message.role, message.content.clone());

        match message.role {
            Role::Assistant if message.requests_tool() => {
                if message.content.is_empty() {
                    wire.content = None;
                }
                let calls = message
                    .tool_calls
                    .iter()
                    .map(|call| {
                        Ok(WireToolCall {
                            id: call.id.clone().unwrap_or_default(),
                            kind: "function".into(),
                            function: WireFunctionCall {
                                name: call.name.clone(),
                                arguments: serde_json::to_string(&call.arguments)?,
                            },
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                wire.tool_calls = Some(calls);
            }
            Role::Tool => {
                wire.tool_call_id = message.tool_call_id().map(str::to_owned);
            }
            _ => {}
        }

        Ok(wire)
    }

    /// Convert the wire response to an agent completion
    fn convert_completion(response: ChatResponse, model: &str) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Parse("No choices in Groq response".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                name: tc.function.name,
                arguments: parse_arguments(&tc.function.arguments),
                id: (!tc.id.is_empty()).then_some(tc.id),
            })
            .collect();

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().and_then(FinishReason::parse),
        })
    }

    async fn read_error(response: reqwest::Response) -> AgentError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        status_to_error(status, &body)
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Groq health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = Self::build_request(messages, tools, options)?;

        tracing::debug!(
            model = %options.model,
            messages = messages.len(),
            tools = tools.len(),
            "Groq chat completion"
        );

        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        Self::convert_completion(data, &options.model)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.config.endpoint("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let data: ModelList = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        Ok(data
            .data
            .into_iter()
            .map(|m| ModelInfo {
                id: m.id,
                context_length: m.context_window,
            })
            .collect())
    }
}

/// Map an HTTP failure to the agent error taxonomy
fn status_to_error(status: u16, body: &str) -> AgentError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_owned))
        .unwrap_or_else(|| body.to_string());

    match status {
        401 | 403 => AgentError::Auth(message),
        429 => AgentError::RateLimited(message),
        500..=599 => AgentError::ProviderUnavailable(format!("HTTP {status}: {message}")),
        _ => AgentError::Provider(format!("HTTP {status}: {message}")),
    }
}

fn transport_error(err: reqwest::Error) -> AgentError {
    if err.is_timeout() || err.is_connect() {
        AgentError::ProviderUnavailable(err.to_string())
    } else {
        AgentError::Provider(err.to_string())
    }
}

/// Tool arguments arrive as a JSON-encoded object string
fn parse_arguments(raw: &str) -> HashMap<String, serde_json::Value> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
        Ok(map) => map.into_iter().collect(),
        Err(e) => {
            tracing::warn!(error = %e, arguments = raw, "Unparseable tool arguments");
            HashMap::new()
        }
    }
}

// Groq wire types (internal)

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: Role, content: String) -> Self {
        Self {
            role: role.as_str().into(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionDef,
}

#[derive(Debug, Serialize)]
struct WireFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<WireModel>,
}

#[derive(Debug, Deserialize)]
struct WireModel {
    id: String,
    #[serde(default)]
    context_window: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tool::ParameterSchema;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GroqProvider {
        let config = GroqConfig {
            base_url: server.uri(),
            ..Default::default()
        }
        .with_api_key("test-key");
        GroqProvider::new(config).unwrap()
    }

    fn calculator_schema() -> ToolSchema {
        ToolSchema::single_string(
            "calculator",
            "Evaluate numeric expressions",
            ParameterSchema::required_string("expression", "Expression to evaluate"),
        )
    }

    #[test]
    fn test_config_defaults() {
        let config = GroqConfig::default();
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = GroqConfig::from_lookup(|key| match key {
            "GROQ_API_KEY" => Some("gsk_abc".into()),
            "GROQ_TIMEOUT_SECS" => Some("30".into()),
            _ => None,
        });
        assert_eq!(config.api_key, "gsk_abc");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.base_url, GROQ_BASE_URL);
        assert!(!format!("{config:?}").contains("gsk_abc"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = GroqProvider::new(GroqConfig::default().with_api_key("   ")).err().unwrap();
        assert!(matches!(err, AgentError::Config(ref msg) if msg == MISSING_KEY_MESSAGE));
    }

    #[test]
    fn test_request_conversion() {
        let call = ToolCall::new("calculator")
            .with_arg("expression", "12 * (3+4)")
            .with_id("call_1");
        let messages = vec![
            Message::user("What is 12 * (3+4)?"),
            Message::assistant_tool_calls("", vec![call]),
            Message::tool("84", Some("call_1".into()), "calculator"),
        ];
        let options = GenerationOptions {
            system_prompt: Some("Be brief.".into()),
            ..Default::default()
        };

        let request = GroqProvider::build_request(&messages, &[calculator_schema()], &options).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "Be brief."}));
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][2]["content"].is_null());
        assert_eq!(body["messages"][2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(
            body["messages"][2]["tool_calls"][0]["function"]["arguments"],
            r#"{"expression":"12 * (3+4)"}"#
        );
        assert_eq!(body["messages"][3]["tool_call_id"], "call_1");
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["required"],
            json!(["expression"])
        );
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_request_without_tools_omits_tool_choice() {
        let request = GroqProvider::build_request(
            &[Message::user("hi")],
            &[],
            &GenerationOptions::default(),
        )
        .unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_arguments(r#"{"query": "Ada Lovelace"}"#)["query"], "Ada Lovelace");
        assert!(parse_arguments("").is_empty());
        assert!(parse_arguments("not json").is_empty());
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error": {"message": "Invalid API Key"}}"#;
        assert!(matches!(status_to_error(401, body), AgentError::Auth(ref m) if m == "Invalid API Key"));
        assert!(matches!(status_to_error(429, body), AgentError::RateLimited(_)));
        assert!(status_to_error(503, "down").is_retryable());
        assert!(matches!(status_to_error(400, "bad"), AgentError::Provider(_)));
    }

    #[tokio::test]
    async fn test_complete_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "llama-3.1-8b-instant"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama-3.1-8b-instant",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "The answer is 84."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 20, "completion_tokens": 6, "total_tokens": 26}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .complete(&[Message::user("12 * 7?")], &[], &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(completion.content, "The answer is 84.");
        assert!(!completion.requests_tool());
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 26);
    }

    #[tokio::test]
    async fn test_complete_tool_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "calculator"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": {"name": "calculator", "arguments": "{\"expression\":\"12 * (3+4)\"}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .complete(
                &[Message::user("What is 12 * (3+4)?")],
                &[calculator_schema()],
                &GenerationOptions::default(),
            )
            .await
            .unwrap();

        assert!(completion.requests_tool());
        assert!(completion.content.is_empty());
        assert_eq!(completion.model, "llama-3.1-8b-instant");
        let call = &completion.tool_calls[0];
        assert_eq!(call.name, "calculator");
        assert_eq!(call.id.as_deref(), Some("call_abc"));
        assert_eq!(call.string_arg("expression").unwrap(), "12 * (3+4)");
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
    }

    #[tokio::test]
    async fn test_complete_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .complete(&[Message::user("hi")], &[], &GenerationOptions::default())
            .await;
        assert!(matches!(result, Err(AgentError::Auth(_))));
    }

    #[tokio::test]
    async fn test_list_models_and_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "llama-3.1-8b-instant", "context_window": 131072}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let models = provider.list_models().await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, "llama-3.1-8b-instant");
        assert_eq!(models[0].context_length, Some(131_072));
        assert!(provider.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check_reports_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(!provider_for(&server).health_check().await.unwrap());
    }
}
