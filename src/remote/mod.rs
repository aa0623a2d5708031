//! Blocking REST client for the candidate, payroll and notification API.

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::HrConfig;

mod collection;

pub use collection::RemoteCollection;

pub const CANDIDATES: &str = "candidates";
pub const PAYROLL: &str = "payroll";
pub const NOTIFICATIONS: &str = "notifications";

const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no API URL configured; set HRBOARD_API_URL or `hrboard settings set apiUrl <url>`")]
    NotConfigured,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Either `{"data": ...}` or the payload itself
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(inner) => inner,
        }
    }
}

pub struct RemoteClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RemoteClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &HrConfig) -> Result<Self, RemoteError> {
        let url = config.api_url.as_deref().ok_or(RemoteError::NotConfigured)?;
        Self::new(url, config.api_token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder, what: &str) -> Result<Response, RemoteError> {
        let response = self.authorized(req).send()?;
        let status = response.status();
        if status.is_success() {
            info!(%status, "{}", what);
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        warn!(%status, %message, "{} failed", what);
        Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let body = response.text()?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.into_inner())
    }

    /// GET a collection, bare or enveloped
    pub fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RemoteError> {
        let response = self.send(self.client.get(self.url(path)), &format!("GET /{}", path))?;
        Self::decode(response)
    }

    /// POST a new resource and return what the server created
    pub fn create<B, T>(&self, path: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.client.post(self.url(path)).json(body);
        let response = self.send(req, &format!("POST /{}", path))?;
        Self::decode(response)
    }

    /// PUT a resource. None when the server answers without a body.
    pub fn update<B, T>(&self, path: &str, id: &str, body: &B) -> Result<Option<T>, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = format!("{}/{}", path, id);
        let req = self.client.put(self.url(&path)).json(body);
        let response = self.send(req, &format!("PUT /{}", path))?;
        let text = response.text()?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        Ok(Some(envelope.into_inner()))
    }

    pub fn delete(&self, path: &str, id: &str) -> Result<(), RemoteError> {
        let path = format!("{}/{}", path, id);
        self.send(self.client.delete(self.url(&path)), &format!("DELETE /{}", path))?;
        Ok(())
    }

    /// Raw response bytes, e.g. a payslip PDF
    pub fn download(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self.send(self.client.get(self.url(path)), &format!("GET /{}", path))?;
        Ok(response.bytes()?.to_vec())
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message`, `error`, `msg`, `detail` and `errors[0].message`,
/// in that order. A plain-text body is returned as is.
pub fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };

    let text = |v: &Value| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    for key in ["message", "error", "msg", "detail"] {
        if let Some(found) = value.get(key).and_then(text) {
            return Some(found);
        }
    }
    value
        .get("errors")
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("message"))
        .and_then(text)
}


#[cfg(test)]
mod tests {
    use super::test_server::serve_once;
    use super::*;
    use crate::models::{Candidate, CandidateStatus, RecordId};

    #[test]
    fn test_extract_error_message() {
        assert_eq!(extract_error_message(r#"{"message":"Not allowed"}"#).as_deref(), Some("Not allowed"));
        assert_eq!(extract_error_message(r#"{"error":"bad token"}"#).as_deref(), Some("bad token"));
        assert_eq!(extract_error_message(r#"{"msg":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(extract_error_message(r#"{"detail":"Gone"}"#).as_deref(), Some("Gone"));
        assert_eq!(
            extract_error_message(r#"{"errors":[{"message":"email taken"}]}"#).as_deref(),
            Some("email taken")
        );
        assert_eq!(
            extract_error_message(r#"{"message":"","error":"fallback"}"#).as_deref(),
            Some("fallback")
        );
        assert_eq!(extract_error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(extract_error_message(r#"{"ok":false}"#), None);
        assert_eq!(extract_error_message("  "), None);
    }

    #[test]
    fn test_list_accepts_bare_array() {
        let body = r#"[{"id":7,"name":"Ava Stone","email":"ava@example.com","role":"Designer","status":"interview"}]"#;
        let (url, server) = serve_once("200 OK", body);
        let client = RemoteClient::new(&url, Some("secret".to_string())).unwrap();

        let candidates: Vec<Candidate> = client.list(CANDIDATES).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, RecordId::Number(7));
        assert_eq!(candidates[0].status, CandidateStatus::Interview);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /candidates HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: bearer secret"));
    }

    #[test]
    fn test_list_accepts_envelope() {
        let body = r#"{"data":[{"id":"c-1","name":"Ben Ode","email":"ben@example.com","role":"QA"}]}"#;
        let (url, server) = serve_once("200 OK", body);
        let client = RemoteClient::new(&url, None).unwrap();

        let candidates: Vec<Candidate> = client.list(CANDIDATES).unwrap();
        assert_eq!(candidates[0].id, RecordId::Text("c-1".to_string()));
        let request = server.join().unwrap();
        assert!(!request.to_lowercase().contains("authorization"));
    }

    #[test]
    fn test_error_status_carries_message() {
        let (url, server) = serve_once("422 Unprocessable Entity", r#"{"errors":[{"message":"email taken"}]}"#);
        let client = RemoteClient::new(&url, None).unwrap();

        let err = client
            .create::<_, Candidate>(CANDIDATES, &Candidate::new("A", "a@example.com", "QA"))
            .unwrap_err();
        match err {
            RemoteError::Status { status, ref message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "email taken");
            }
            other => panic!("unexpected error: {other}"),
        }
        let request = server.join().unwrap();
        assert!(request.starts_with("POST /candidates HTTP/1.1"));
        assert!(request.contains(r#""email":"a@example.com""#));
    }

    #[test]
    fn test_undecodable_body() {
        let (url, server) = serve_once("200 OK", r#"{"unexpected":true}"#);
        let client = RemoteClient::new(&url, None).unwrap();
        assert!(matches!(client.list::<Candidate>(CANDIDATES), Err(RemoteError::Decode(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_download_and_delete() {
        let (url, server) = serve_once("200 OK", "%PDF-1.7");
        let client = RemoteClient::new(&url, None).unwrap();
        assert_eq!(client.download("payroll/3/pdf").unwrap(), b"%PDF-1.7");
        assert!(server.join().unwrap().starts_with("GET /payroll/3/pdf "));

        let (url, server) = serve_once("204 No Content", "");
        let client = RemoteClient::new(&url, None).unwrap();
        client.delete(PAYROLL, "3").unwrap();
        assert!(server.join().unwrap().starts_with("DELETE /payroll/3 "));
    }

    #[test]
    fn test_update_with_and_without_body() {
        let (url, server) = serve_once("200 OK", r#"{"data":{"id":5,"name":"Ana","email":"a@example.com","role":"QA","status":"offered"}}"#);
        let client = RemoteClient::new(&url, None).unwrap();
        let body = serde_json::json!({"status": "offered"});
        let updated: Option<Candidate> = client.update(CANDIDATES, "5", &body).unwrap();
        assert_eq!(updated.unwrap().status, CandidateStatus::Offered);
        assert!(server.join().unwrap().starts_with("PUT /candidates/5 "));

        let (url, server) = serve_once("204 No Content", "");
        let client = RemoteClient::new(&url, None).unwrap();
        let updated: Option<Candidate> = client.update(CANDIDATES, "5", &body).unwrap();
        assert!(updated.is_none());
        server.join().unwrap();
    }

    #[test]
    fn test_transport_error() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = RemoteClient::new(&format!("http://127.0.0.1:{}", port), None).unwrap();
        assert!(matches!(client.list::<Candidate>(CANDIDATES), Err(RemoteError::Transport(_))));
    }

    #[test]
    fn test_not_configured() {
        let config = HrConfig::default();
        assert!(matches!(RemoteClient::from_config(&config), Err(RemoteError::NotConfigured)));
    }
}
