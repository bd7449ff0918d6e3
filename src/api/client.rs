use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::models::ArtworkPage;

use super::normalize::normalize_response;
use super::ArtworkSource;

/// Public collection endpoint of the Art Institute of Chicago.
pub const DEFAULT_ENDPOINT: &str = "https://api.artic.edu/api/v1/artworks";
/// Field list sent with every request. The table never needs more than this.
pub const FIELDS: &str = "id,title,place_of_origin,artist_display,inscriptions,date_start,date_end";
/// Header the API uses to identify well-behaved clients.
const USER_AGENT_HEADER: &str = "AIC-User-Agent";

/// `reqwest` backed [`ArtworkSource`]. One GET per page, no retries and no
/// caching: every call goes to the network.
pub struct ArticClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ArticClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(agent) = config.user_agent.as_deref() {
            let value = HeaderValue::from_str(agent).map_err(|err| {
                FetchError::InvalidRequest(format!("invalid user agent {agent:?}: {err}"))
            })?;
            headers.insert(USER_AGENT_HEADER, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ArtworkSource for ArticClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<ArtworkPage, FetchError> {
        validate_request(page, limit)?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("fields", FIELDS.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        let normalized = normalize_response(&body);
        debug!(
            rows = normalized.rows.len(),
            total = normalized.total,
            "fetched artworks page"
        );
        Ok(normalized)
    }
}

/// Reject requests the endpoint would answer with garbage before spending a
/// round trip on them.
pub(crate) fn validate_request(page: u32, limit: u32) -> Result<(), FetchError> {
    if page == 0 {
        return Err(FetchError::InvalidRequest(
            "page numbers start at 1".to_string(),
        ));
    }
    if limit == 0 {
        return Err(FetchError::InvalidRequest(
            "limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            endpoint: "http://127.0.0.1:9/api/v1/artworks".to_string(),
            timeout_secs: Some(1),
            user_agent: Some("artwork-table (test)".to_string()),
        }
    }

    /// Serve one canned HTTP response on a local port. The task yields the
    /// request head it received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind local port");
        let addr = listener.local_addr().expect("local address");
        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept client");
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.expect("read request");
                if read == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..read]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}/api/v1/artworks"), task)
    }

    fn local_client(endpoint: String) -> ArticClient {
        ArticClient::new(&ApiConfig {
            endpoint,
            timeout_secs: Some(5),
            user_agent: Some("artwork-table (test)".to_string()),
        })
        .expect("client builds")
    }

    #[test]
    fn validate_request_rejects_zero_page_and_limit() {
        assert!(validate_request(1, 10).is_ok());
        assert!(matches!(
            validate_request(0, 10),
            Err(FetchError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_request(1, 0),
            Err(FetchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn field_list_matches_record_shape() {
        let fields: Vec<&str> = FIELDS.split(',').collect();
        assert_eq!(
            fields,
            [
                "id",
                "title",
                "place_of_origin",
                "artist_display",
                "inscriptions",
                "date_start",
                "date_end"
            ]
        );
    }

    #[test]
    fn rejects_user_agent_with_control_characters() {
        let mut cfg = config();
        cfg.user_agent = Some("bad\nagent".to_string());
        assert!(matches!(
            ArticClient::new(&cfg),
            Err(FetchError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn invalid_page_never_reaches_the_network() {
        let client = ArticClient::new(&config()).expect("client builds");
        let result = client.fetch_page(0, 10).await;
        assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let client = ArticClient::new(&config()).expect("client builds");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/api/v1/artworks");
        let result = client.fetch_page(1, 10).await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn request_carries_page_limit_and_fields() {
        let body = r#"{"pagination":{"total":42},"data":[{"id":7,"title":"Nighthawks"}]}"#;
        let (endpoint, server) = serve_once("200 OK", body).await;
        let page = local_client(endpoint)
            .fetch_page(2, 5)
            .await
            .expect("page fetched");

        let head = server.await.expect("server finished");
        let request_line = head.lines().next().unwrap_or_default();
        assert_eq!(
            request_line,
            "GET /api/v1/artworks?page=2&limit=5&fields=id%2Ctitle%2Cplace_of_origin%2Cartist_display%2Cinscriptions%2Cdate_start%2Cdate_end HTTP/1.1"
        );
        assert!(head
            .to_ascii_lowercase()
            .contains("aic-user-agent: artwork-table (test)"));
        assert_eq!(page.total, 42);
        assert_eq!(page.rows[0].id, 7);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "").await;
        let result = local_client(endpoint).fetch_page(1, 10).await;
        server.await.expect("server finished");
        assert!(matches!(result, Err(FetchError::Status { status: 500 })));
    }

    #[tokio::test]
    async fn unreadable_body_is_a_decode_error() {
        let (endpoint, server) = serve_once("200 OK", "{oops").await;
        let result = local_client(endpoint).fetch_page(1, 10).await;
        server.await.expect("server finished");
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }
}
