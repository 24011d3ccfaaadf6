//! OpenAiChatClient -- concrete [`ChatStreamProvider`] for OpenAI-compatible
//! chat completion endpoints.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header; the client has no `Debug` impl.

use std::time::Duration;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};

use sakura_core::chat::{ChatEventStream, ChatStreamProvider};
use sakura_types::chat::{ChatMessage, ChatRequest};
use sakura_types::error::ChatError;

use super::event_stream::parse_event_stream;

/// Default API root for OpenAI.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl OpenAiChatClient {
    /// Create a client for `model` against the default OpenAI endpoint.
    ///
    /// Only the connect phase has a timeout; a streamed answer may take as
    /// long as the model needs.
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChatError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        })
    }

    /// Override the base URL (proxies, compatible servers, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn streaming_request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            stream: Some(true),
        }
    }
}

impl ChatStreamProvider for OpenAiChatClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn stream_chat(&self, messages: Vec<ChatMessage>) -> ChatEventStream {
        tracing::debug!(model = %self.model, turns = messages.len(), "opening chat stream");
        create_chat_stream(
            &self.client,
            &self.url(),
            self.streaming_request(messages),
            &self.api_key,
        )
    }
}

/// Fail with [`ChatError::Status`] unless the response is a success.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, body = %body, "chat stream API error response");
    Err(ChatError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Open a streaming chat completion.
///
/// Nothing is sent until the returned stream is first polled. A rejected
/// request surfaces as a single error item before any event.
pub fn create_chat_stream(
    client: &reqwest::Client,
    url: &str,
    body: ChatRequest,
    api_key: &SecretString,
) -> ChatEventStream {
    let client = client.clone();
    let url = url.to_string();
    let api_key = api_key.expose_secret().to_string();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .bearer_auth(&api_key)
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Http(e.to_string()))?;

        let response = check_status(response).await?;

        let mut events = parse_event_stream(response.bytes_stream());
        while let Some(event) = events.next().await {
            yield event?;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use sakura_types::chat::ChatDeltaEvent;

    const SSE_BODY: &str = concat!(
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hel\"}}]}\n\n",
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n",
        "data: {\"id\":\"c1\",\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    async fn completions(headers: HeaderMap, body: String) -> Response {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some("Bearer sk-test");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, "bad key").into_response();
        }

        let request: serde_json::Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(_) => return (StatusCode::BAD_REQUEST, "bad json").into_response(),
        };
        if request["stream"] != true || request["model"] != "gpt-4o" {
            return (StatusCode::BAD_REQUEST, "expected a streaming gpt-4o request").into_response();
        }

        Response::builder()
            .header(header::CONTENT_TYPE, "text/event-stream")
            .body(Body::from(SSE_BODY))
            .unwrap()
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn client_for(key: &str) -> OpenAiChatClient {
        let base = serve(Router::new().route("/chat/completions", post(completions))).await;
        OpenAiChatClient::new(SecretString::from(key.to_string()), DEFAULT_MODEL)
            .unwrap()
            .with_base_url(format!("{base}/"))
    }

    #[test]
    fn test_url_and_request_shape() {
        let client = OpenAiChatClient::new(SecretString::from("k".to_string()), "gpt-4o")
            .unwrap()
            .with_base_url("http://localhost:9999/v1/");
        assert_eq!(client.url(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(client.model(), "gpt-4o");
        assert_eq!(client.name(), "openai");

        let request = client.streaming_request(vec![ChatMessage::user_text("hi")]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_default_base_url() {
        let client = OpenAiChatClient::new(SecretString::from("k".to_string()), DEFAULT_MODEL).unwrap();
        assert_eq!(client.url(), "https://api.openai.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_stream_chat_yields_fragments() {
        let client = client_for("sk-test").await;
        let events: Vec<ChatDeltaEvent> = client
            .stream_chat(vec![ChatMessage::user_text("hi")])
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(events.len(), 4);
        let text: String = events.iter().map(|e| e.primary_content()).collect();
        assert_eq!(text, "Hello");
        assert_eq!(events[3].finish_reason(), Some("stop"));
        assert_eq!(events[1].model_name, "gpt-4o");
    }

    #[tokio::test]
    async fn test_rejected_request_is_status_error_before_events() {
        let client = client_for("sk-wrong").await;
        let mut stream = client.stream_chat(vec![ChatMessage::user_text("hi")]);

        match stream.next().await {
            Some(Err(ChatError::Status { status, body })) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OpenAiChatClient::new(SecretString::from("k".to_string()), DEFAULT_MODEL)
            .unwrap()
            .with_base_url(format!("http://{addr}"));
        let mut stream = client.stream_chat(vec![ChatMessage::user_text("hi")]);
        assert!(matches!(stream.next().await, Some(Err(ChatError::Http(_)))));
    }
}
