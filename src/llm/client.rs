use anyhow::Result;
use async_trait::async_trait;

/// A single chat completion request. All cascade prompts are one-shot; there
/// is no conversation state.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: 0.3,
            max_tokens: 400,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Canned-response client for --dry-run and tests. Responses are keyed on
/// distinctive phrases from the prompt templates.
pub struct MockLlmClient;

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let prompt = &request.prompt;

        if prompt.contains("name extraction expert") {
            // Aggressive web-context extraction
            Ok(r#"{
    "ceo_name": "Jane Maxwell",
    "ceo_title": "Chief Executive Officer",
    "confidence": "high",
    "source": "mock analysis"
}"#
            .to_string())
        } else if prompt.contains("expert business researcher") {
            Ok(r#"{
    "ceo_name": "Omar Diaz",
    "ceo_title": "Founder",
    "confidence": "medium",
    "source": "mock analysis"
}"#
            .to_string())
        } else if prompt.contains("most likely LinkedIn profile URL") {
            Ok("https://linkedin.com/in/jane-maxwell".to_string())
        } else if prompt.starts_with("Who is") || prompt.starts_with("Who owns") {
            Ok("As far as I know, John Smith is the chief executive.".to_string())
        } else {
            Ok("Not found".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_builder() {
        let req = CompletionRequest::new("hello")
            .with_system("be brief")
            .with_temperature(0.1)
            .with_max_tokens(50);
        assert_eq!(req.prompt, "hello");
        assert_eq!(req.system.as_deref(), Some("be brief"));
        assert!((req.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, 50);
    }

    #[tokio::test]
    async fn test_mock_extraction_reply() {
        let client = MockLlmClient::new();
        let reply = client
            .complete(&CompletionRequest::new(
                "You are a name extraction expert. ...",
            ))
            .await
            .unwrap();
        assert!(reply.contains("Jane Maxwell"));
    }

    #[tokio::test]
    async fn test_mock_knowledge_reply() {
        let client = MockLlmClient::new();
        let reply = client
            .complete(&CompletionRequest::new("Who is the CEO of Acme?"))
            .await
            .unwrap();
        assert!(reply.contains("John Smith"));
    }

    #[tokio::test]
    async fn test_mock_default_reply() {
        let client = MockLlmClient::new();
        let reply = client
            .complete(&CompletionRequest::new("unrelated prompt"))
            .await
            .unwrap();
        assert_eq!(reply, "Not found");
    }
}
