use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::observability::{
    CHAT_COMPLETIONS, CHAT_EMPTY_RESPONSES, CHAT_TOKENS, CLIENT_REQUEST_DURATION,
    CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatReply, ModelDescriptor, ModelList,
};

/// Base URL used when bootstrapping a profile from scratch.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The remote operations the chat loop needs from a provider.
///
/// [`Client`] is the HTTP implementation; the dispatcher and profile bootstrap are written
/// against this trait.
#[async_trait::async_trait]
pub trait ModelApi: Send + Sync {
    /// List the identifiers of every model the provider advertises, in server order.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Fetch metadata for one model.
    async fn model_info(&self, model: &str) -> Result<ModelDescriptor>;

    /// Send `message` to `model` as a fresh single-turn conversation.
    async fn chat(&self, model: &str, message: &str) -> Result<ChatReply>;
}

/// Client for an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct Client {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl Client {
    /// Create a new client bound to `base_url` and `api_key`.
    ///
    /// Both values are required; the client never changes them afterwards.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom per-request timeout.
    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if base_url.trim().is_empty() || api_key.trim().is_empty() {
            return Err(Error::invalid_parameters("base URL or API key is empty"));
        }
        // The key has to be a valid header value.
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::invalid_parameters("API key contains invalid characters"))?;

        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key: api_key.to_string(),
            client,
            base_url: base_url.to_string(),
            timeout,
        })
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::invalid_parameters("API key contains invalid characters"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Issue one request and return the response if its status is 200.
    ///
    /// Any other status consumes the body and surfaces it verbatim in [`Error::Api`].
    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!(%method, %url, "sending request");
        CLIENT_REQUESTS.click();

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .headers(self.default_headers()?);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            CLIENT_REQUEST_ERRORS.click();
            tracing::warn!(%method, %url, error = %e, "request failed");
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    Some(self.timeout.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let status = response.status();
        if status != StatusCode::OK {
            CLIENT_REQUEST_ERRORS.click();
            let body = response.text().await.map_err(|e| {
                Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                )
            })?;
            tracing::warn!(%method, %url, status = status.as_u16(), "provider returned an error");
            return Err(Error::api(status.as_u16(), body));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(|e| {
            Error::http_client(
                format!("Failed to read response body: {}", e),
                Some(Box::new(e)),
            )
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            Error::decode(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl ModelApi for Client {
    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.request::<()>(Method::GET, "models", None).await?;
        let list: ModelList = Self::read_json(response).await?;
        Ok(list.into_ids())
    }

    async fn model_info(&self, model: &str) -> Result<ModelDescriptor> {
        let endpoint = format!("models/{model}");
        let response = self.request::<()>(Method::GET, &endpoint, None).await?;
        Self::read_json(response).await
    }

    async fn chat(&self, model: &str, message: &str) -> Result<ChatReply> {
        let payload = ChatCompletionRequest::single_turn(model, message);

        let start = Instant::now();
        let response = self
            .request(Method::POST, "chat/completions", Some(&payload))
            .await?;
        let completion: ChatCompletionResponse = Self::read_json(response).await?;
        let elapsed = start.elapsed().as_secs_f64();

        let Some(content) = completion.answer() else {
            CHAT_EMPTY_RESPONSES.click();
            return Err(Error::empty_response(format!(
                "{} choices, no usable content",
                completion.choices.len()
            )));
        };

        let completion_time = completion
            .usage
            .reported_completion_time()
            .unwrap_or(elapsed.max(f64::EPSILON));
        CHAT_COMPLETIONS.click();
        CHAT_TOKENS.count(completion.usage.total_tokens);
        tracing::debug!(
            model,
            total_tokens = completion.usage.total_tokens,
            completion_time,
            "chat completed"
        );

        Ok(ChatReply {
            content: content.to_string(),
            total_tokens: completion.usage.total_tokens,
            completion_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = Client::new("https://api.example.com/v1", "test-key").unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url(), "https://api.example.com/v1");
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = Client::with_timeout(
            "https://api.example.com/v1",
            "test-key",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn empty_parameters_are_rejected() {
        assert!(matches!(
            Client::new("", "key"),
            Err(Error::InvalidParameters { .. })
        ));
        assert!(matches!(
            Client::new("https://api.example.com", ""),
            Err(Error::InvalidParameters { .. })
        ));
        assert!(matches!(
            Client::new("   ", "key"),
            Err(Error::InvalidParameters { .. })
        ));
    }

    #[test]
    fn endpoint_composition() {
        let client = Client::new("https://api.example.com/v1", "k").unwrap();
        assert_eq!(
            client.endpoint_url("chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
        let client = Client::new("https://api.example.com/v1/", "k").unwrap();
        assert_eq!(
            client.endpoint_url("models/llama"),
            "https://api.example.com/v1/models/llama"
        );
    }

    #[test]
    fn headers_carry_bearer_token() {
        let client = Client::new("https://api.example.com/v1", "sk-123").unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer sk-123");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }
}
