//! reqwest-backed transport for the hosted REST API.
//!
//! Every request carries the service key twice, as the `apikey` header and
//! as a bearer token, which is what the hosted gateway expects.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ServiceConfig;
use crate::error::{Result, ShelfError};
use crate::rest::{Method, RestRequest, Transport};

/// Path prefix of the REST API under the project URL
const REST_PREFIX: [&str; 2] = ["rest", "v1"];

pub struct HttpTransport {
    client: Client,
    base: Url,
    key: String,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shelfctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ShelfError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    /// Use a preconfigured client; timeout and proxy settings are the caller's
    pub fn with_client(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            base: config.url.clone(),
            key: config.key.clone(),
        }
    }

    /// Absolute URL for a request, query string included
    pub fn endpoint(&self, request: &RestRequest) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ShelfError::config(format!("cannot use '{}' as a base URL", self.base)))?
            .pop_if_empty()
            .extend(REST_PREFIX)
            .extend(request.path.split('/'));
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(method = ?request.method, path = %request.path))]
    async fn execute(&self, request: RestRequest) -> Result<Value> {
        let url = self.endpoint(&request)?;
        debug!(%url, "sending request");

        let mut builder = self
            .client
            .request(reqwest_method(request.method), url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key);
        if request.returning {
            builder = builder.header("Prefer", "return=representation");
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| ShelfError::Http {
            path: request.path.clone(),
            source,
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|source| ShelfError::Http {
            path: request.path.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(ShelfError::api(&request.path, status.as_u16(), text));
        }
        debug!(status = status.as_u16(), bytes = text.len(), "response received");

        decode_body(&text, &request.path)
    }
}

/// Decode a success body; the backend sends nothing for some writes
pub fn decode_body(text: &str, path: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ShelfError::json(format!("response from {}", path), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_service_url;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    fn transport(url: &str) -> HttpTransport {
        HttpTransport::new(&ServiceConfig {
            url: parse_service_url(url).unwrap(),
            key: "k".to_string(),
            timeout: Duration::from_secs(1),
            top_limit: 5,
        })
        .unwrap()
    }

    fn request(path: &str, query: &[(&str, &str)]) -> RestRequest {
        RestRequest {
            method: Method::Get,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
            returning: false,
        }
    }

    /// Transport that talks to the local server directly, whatever proxy
    /// variables the environment sets
    fn local_transport(base: &str) -> HttpTransport {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpTransport::with_client(
            client,
            &ServiceConfig {
                url: parse_service_url(base).unwrap(),
                key: "k".to_string(),
                timeout: Duration::from_secs(5),
                top_limit: 5,
            },
        )
    }

    /// Answer exactly one request with `status` and `body`; the handle yields
    /// the raw request as received
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let raw = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            raw
        });
        (base, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|v| v.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_execute_sends_key_headers_and_prefer_on_writes() {
        let (base, server) = serve_once("201 Created", r#"[{"id":1}]"#);
        let insert = RestRequest {
            method: Method::Post,
            body: Some(json!({"title": "Dune"})),
            returning: true,
            ..request("books", &[])
        };

        let value = local_transport(&base).execute(insert).await.unwrap();
        assert_eq!(value, json!([{"id": 1}]));

        let raw = server.join().unwrap();
        let lower = raw.to_lowercase();
        assert!(lower.starts_with("post /rest/v1/books http/1.1\r\n"));
        assert!(lower.contains("\r\napikey: k\r\n"));
        assert!(lower.contains("\r\nauthorization: bearer k\r\n"));
        assert!(lower.contains("\r\nprefer: return=representation\r\n"));
        assert!(raw.ends_with(r#"{"title":"Dune"}"#));
    }

    #[tokio::test]
    async fn test_execute_maps_rejection_to_api_error() {
        let (base, server) = serve_once("400 Bad Request", r#"{"message":"bad filter"}"#);

        let err = local_transport(&base)
            .execute(request("books", &[("select", "*")]))
            .await
            .unwrap_err();
        match err {
            ShelfError::Api { path, status, body } => {
                assert_eq!(path, "books");
                assert_eq!(status, 400);
                assert_eq!(body, r#"{"message":"bad filter"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let lower = server.join().unwrap().to_lowercase();
        assert!(lower.starts_with("get /rest/v1/books?select=* http/1.1\r\n"));
        assert!(lower.contains("\r\napikey: k\r\n"));
        assert!(!lower.contains("\r\nprefer:"));
    }

    #[tokio::test]
    async fn test_execute_empty_success_is_null() {
        let (base, server) = serve_once("204 No Content", "");
        let delete = RestRequest {
            method: Method::Delete,
            returning: true,
            ..request("books", &[("book_id", "eq.3")])
        };

        let value = local_transport(&base).execute(delete).await.unwrap();
        assert_eq!(value, Value::Null);
        assert!(server
            .join()
            .unwrap()
            .starts_with("DELETE /rest/v1/books?book_id=eq.3 HTTP/1.1\r\n"));
    }

    #[test]
    fn test_endpoint_for_table() {
        let url = transport("https://abc.supabase.co/")
            .endpoint(&request("books", &[("select", "*"), ("order", "title.asc")]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/books?select=*&order=title.asc"
        );
    }

    #[test]
    fn test_endpoint_for_rpc_without_query() {
        let url = transport("https://abc.supabase.co")
            .endpoint(&request("rpc/return_book", &[]))
            .unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/rpc/return_book");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes_filters() {
        let url = transport("http://localhost:54321/proxy")
            .endpoint(&request("books", &[("or", "(title.ilike.\"*a,b*\")")]))
            .unwrap();
        assert_eq!(url.path(), "/proxy/rest/v1/books");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("or".to_string(), "(title.ilike.\"*a,b*\")".to_string())]
        );
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body("", "books").unwrap(), Value::Null);
        assert_eq!(decode_body("  \n", "books").unwrap(), Value::Null);
        assert_eq!(decode_body("[]", "books").unwrap(), Value::Array(vec![]));
        let err = decode_body("<html>", "books").unwrap_err();
        assert!(err.to_string().contains("response from books"));
    }
}
