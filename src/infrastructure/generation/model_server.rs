use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::ModelServerConfig;
use crate::domain::{DomainError, GenerateRequest, GenerationBackend, GenerationStream};

/// Forwards generation requests to the model server over HTTP
#[derive(Debug, Clone)]
pub struct ModelServerClient {
    client: reqwest::Client,
    base_url: String,
}

impl ModelServerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ModelServerConfig) -> Result<Self, DomainError> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post(
        &self,
        path: &str,
        request: &GenerateRequest,
    ) -> Result<reqwest::Response, DomainError> {
        let url = self.endpoint(path);
        debug!(url = %url, messages = request.dialogue_history.len(), "Calling model server");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Error calling model server");
                DomainError::upstream(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(url = %url, status = %status, "Model server returned an error");
            return Err(DomainError::upstream(format!(
                "HTTP {}: {}",
                status, error_body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerationBackend for ModelServerClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<serde_json::Value, DomainError> {
        self.post("generate", request)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::upstream(format!("Failed to parse response: {}", e)))
    }

    async fn generate_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerationStream, DomainError> {
        let response = self.post("generate_stream", request).await?;

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| DomainError::upstream(format!("Stream error: {}", e)))
        });

        Ok(Box::pin(stream))
    }

    /// Any HTTP answer counts as reachable; only transport failures do not
    async fn ping(&self) -> Result<(), DomainError> {
        self.client
            .get(&self.base_url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| DomainError::upstream(format!("Model server unreachable: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DialogueMessage;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ModelServerClient {
        ModelServerClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn hello_request() -> GenerateRequest {
        GenerateRequest::new(vec![DialogueMessage::user("hello")])
    }

    #[tokio::test]
    async fn test_generate_forwards_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_partial_json(json!({
                "dialogue_history": [{"role": "user", "content": "hello"}],
                "max_length": 50,
                "temperature": 1.0
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"generated_text": "hi"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).generate(&hello_request()).await.unwrap();

        assert_eq!(result["generated_text"], "hi");
    }

    #[tokio::test]
    async fn test_generate_stream_yields_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_stream"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello there"))
            .mount(&server)
            .await;

        let mut stream = client_for(&server)
            .generate_stream(&hello_request())
            .await
            .unwrap();

        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"hello there");
    }

    #[tokio::test]
    async fn test_server_error_maps_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result = client_for(&server).generate(&hello_request()).await;

        match result {
            Err(DomainError::Upstream { message }) => assert!(message.contains("500")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client =
            ModelServerClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();

        assert!(matches!(
            client.generate(&hello_request()).await,
            Err(DomainError::Upstream { .. })
        ));
        assert!(client.ping().await.is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ModelServerClient::new("http://localhost:5000/", Duration::from_secs(1))
            .unwrap();

        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.endpoint("generate"), "http://localhost:5000/generate");
    }
}
