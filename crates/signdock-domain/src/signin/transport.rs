use async_trait::async_trait;
use std::time::Duration;

use crate::account::HttpMethod;
use crate::shared::DomainError;

/// Fully prepared outbound check-in request.
#[derive(Debug, Clone, PartialEq)]
pub struct SigninRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Ordered, already merged. Names are unique case-insensitively.
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl SigninRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigninResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl SigninResponse {
    /// 2xx and 3xx count as a successful exchange.
    pub fn is_success_status(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Sends check-in requests. Any HTTP status is a response; only transport
/// failures (DNS, connect, timeout) are errors.
#[async_trait]
pub trait SigninTransport: Send + Sync {
    async fn send(
        &self,
        request: &SigninRequest,
        timeout: Duration,
    ) -> Result<SigninResponse, DomainError>;
}
