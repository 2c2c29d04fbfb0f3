//! HttpBulkSender - POSTs bulk payloads over HTTP

use std::time::Duration;

use bytes::Bytes;
use contracts::{BulkSender, ContractError, Credentials};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::DispatcherError;
use crate::selector::bulk_url;

/// Longest response body kept in a status error
const MAX_ERROR_BODY: usize = 512;

/// Bulk sender backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpBulkSender {
    client: Client,
    credentials: Credentials,
}

impl HttpBulkSender {
    /// Build a sender with a per-request timeout
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, DispatcherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatcherError::client_build(e.to_string()))?;
        Ok(Self::with_client(client, credentials))
    }

    /// Build with an existing client
    pub fn with_client(client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

impl BulkSender for HttpBulkSender {
    #[instrument(
        name = "http_bulk_send",
        skip(self, endpoint, payload),
        fields(endpoint = %endpoint, bytes = payload.len())
    )]
    async fn send_bulk(&self, endpoint: &str, payload: Bytes) -> Result<(), ContractError> {
        let response = self
            .client
            .post(bulk_url(endpoint))
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .await
            .map_err(|e| ContractError::delivery(endpoint, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint = %endpoint, status = status.as_u16(), "Bulk accepted");
            return Ok(());
        }

        let mut body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }

        Err(ContractError::DeliveryStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(Option<String>, String)>>>,
    }

    async fn bulk_handler(
        State(captured): State<Captured>,
        headers: HeaderMap,
        body: String,
    ) -> StatusCode {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        captured.requests.lock().unwrap().push((auth, body));
        StatusCode::OK
    }

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        format!("http://{addr}")
    }

    fn sender() -> HttpBulkSender {
        HttpBulkSender::new(Credentials::new("admin", "pw"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_bulk_posts_payload_with_basic_auth() {
        let captured = Captured::default();
        let router = Router::new()
            .route("/api/_bulk", post(bulk_handler))
            .with_state(captured.clone());
        let endpoint = spawn_server(router).await;

        let payload = Bytes::from_static(b"{\"index\":{\"_index\":\"a\"}}\n{\"n\":1}\n");
        sender()
            .send_bulk(&format!("{endpoint}/"), payload.clone())
            .await
            .unwrap();

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        // "admin:pw" base64
        assert_eq!(requests[0].0.as_deref(), Some("Basic YWRtaW46cHc="));
        assert_eq!(requests[0].1.as_bytes(), &payload[..]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let router = Router::new().route(
            "/api/_bulk",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad credentials") }),
        );
        let endpoint = spawn_server(router).await;

        let err = sender()
            .send_bulk(&endpoint, Bytes::from_static(b"x\ny\n"))
            .await
            .unwrap_err();
        match err {
            ContractError::DeliveryStatus { status, body, .. } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = sender()
            .send_bulk(&format!("http://{addr}"), Bytes::from_static(b"x\ny\n"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Delivery { .. }), "got: {err:?}");
    }
}
