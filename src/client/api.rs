//! HTTP client for the prediction backend.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::ApiError;
use crate::data::report::{Report, ReportRow};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Account details returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(default = "active_default")]
    pub active: bool,
}

fn active_default() -> bool {
    true
}

/// Operations the dashboard needs from the backend.
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Exchange credentials for a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;

    /// Fetch the profile behind a token.
    async fn me(&self, token: &str) -> Result<UserProfile, ApiError>;

    /// Switch the streamed engine unit. Returns the server's message.
    async fn set_engine(&self, token: Option<&str>, unit_id: u32) -> Result<String, ApiError>;

    /// Upload a C-MAPSS test file for batch RUL analysis.
    async fn upload_test(
        &self,
        token: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Report, ApiError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct EngineResponse {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Rows(Vec<ReportRow>),
    Failed { error: String },
}

/// reqwest-backed [`Backend`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
        fallback: &str,
    ) -> Result<Response, ApiError> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        check_status(response, fallback).await
    }
}

/// Map a non-success response to an error carrying the server's `detail`.
async fn check_status(response: Response, fallback: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .map(|detail| match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| fallback.to_string());

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ApiError::Auth(detail))
    } else {
        Err(ApiError::Http {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }));
        let response = self.send(request, None, "Login failed").await?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                tracing::info!(username, "Logged in");
                Ok(token)
            }
            _ => Err(ApiError::Parse("No token received".to_string())),
        }
    }

    async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        let request = self.client.get(self.url("/auth/me"));
        let response = self
            .send(request, Some(token), "Failed to fetch user info")
            .await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn set_engine(&self, token: Option<&str>, unit_id: u32) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.url("/set_engine"))
            .json(&json!({ "unit_id": unit_id }));
        let response = self.send(request, token, "Engine switch failed").await?;

        let body: EngineResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        tracing::info!(unit_id, "Switched engine");
        Ok(body
            .message
            .unwrap_or_else(|| format!("Switched to Engine {}", unit_id)))
    }

    async fn upload_test(
        &self,
        token: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Report, ApiError> {
        let size = contents.len();
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let request = self.client.post(self.url("/upload_test")).multipart(form);
        let response = self.send(request, Some(token), "Upload failed").await?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        match body {
            UploadResponse::Rows(rows) => {
                tracing::info!(file_name, size, engines = rows.len(), "Analyzed upload");
                Ok(Report::new(rows))
            }
            UploadResponse::Failed { error } => Err(ApiError::Analysis(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EngineStatus;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let (url, server) = serve_once("200 OK", r#"{"access_token":"abc.def","token_type":"bearer"}"#).await;
        let client = ApiClient::new(&url).unwrap();

        let token = client.login("admin", "admin123").await.unwrap();
        assert_eq!(token, "abc.def");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /auth/login "));
        assert!(request.contains(r#""username":"admin""#));
    }

    #[tokio::test]
    async fn test_login_rejected_surfaces_detail() {
        let (url, _server) =
            serve_once("401 Unauthorized", r#"{"detail":"Incorrect username or password"}"#).await;
        let client = ApiClient::new(&url).unwrap();

        let err = client.login("admin", "wrong").await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "Authentication failed: Incorrect username or password");
    }

    #[tokio::test]
    async fn test_login_unparseable_error_falls_back() {
        let (url, _server) = serve_once("500 Internal Server Error", "oops").await;
        let client = ApiClient::new(&url).unwrap();

        match client.login("admin", "admin123").await.unwrap_err() {
            ApiError::Http { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "Login failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_without_token() {
        let (url, _server) = serve_once("200 OK", r#"{"token_type":"bearer"}"#).await;
        let client = ApiClient::new(&url).unwrap();

        let err = client.login("admin", "admin123").await.unwrap_err();
        assert!(err.to_string().contains("No token received"));
    }

    #[tokio::test]
    async fn test_me_sends_bearer_token() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"username":"engineer","email":"eng@aegisflow.io","role":"engineer","active":true}"#,
        )
        .await;
        let client = ApiClient::new(&url).unwrap();

        let profile = client.me("tok").await.unwrap();
        assert_eq!(profile.username, "engineer");
        assert_eq!(profile.role, "engineer");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /auth/me "));
        assert!(request.contains("authorization: bearer tok"));
    }

    #[tokio::test]
    async fn test_set_engine() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"status":"ok","message":"Switched to Engine 12","user":"admin"}"#,
        )
        .await;
        let client = ApiClient::new(&url).unwrap();

        let message = client.set_engine(Some("tok"), 12).await.unwrap();
        assert_eq!(message, "Switched to Engine 12");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /set_engine "));
        assert!(request.contains(r#"{"unit_id":12}"#));
    }

    #[tokio::test]
    async fn test_upload_returns_report() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"engine_id":1,"current_cycle":31,"predicted_RUL":112.4,"estimated_failure_cycle":143,
                "status":"Healthy","failure_reason":"Normal wear and tear","confidence":94.2}]"#,
        )
        .await;
        let client = ApiClient::new(&url).unwrap();

        let report = client
            .upload_test("tok", "test_FD001.txt", b"1 1 -0.0007 ...".to_vec())
            .await
            .unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].status, EngineStatus::Healthy);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /upload_test "));
        assert!(request.contains(r#"name="file"; filename="test_FD001.txt""#));
    }

    #[tokio::test]
    async fn test_upload_error_payload() {
        let (url, _server) = serve_once("200 OK", r#"{"error":"Could not parse file"}"#).await;
        let client = ApiClient::new(&url).unwrap();

        let err = client.upload_test("tok", "bad.txt", Vec::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Analysis(ref e) if e == "Could not parse file"));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.login("admin", "admin123").await.unwrap_err();
        assert!(matches!(err, ApiError::Connection(_)));
    }
}
