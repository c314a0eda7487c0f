use async_trait::async_trait;
use log::debug;
use std::time::Duration;

use super::types::{build_header_map, to_reqwest_method};
use signdock_domain::shared::DomainError;
use signdock_domain::signin::{SigninRequest, SigninResponse, SigninTransport};

#[async_trait]
impl SigninTransport for super::HttpClient {
    async fn send(
        &self,
        request: &SigninRequest,
        timeout: Duration,
    ) -> Result<SigninResponse, DomainError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url)
            .headers(build_header_map(&request.headers))
            .timeout(timeout);

        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        debug!("➡️  {} {}", request.method, request.url);

        let response = builder
            .send()
            .await
            .map_err(|e| describe_transport_error(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| describe_transport_error(e, timeout))?;

        debug!(
            "⬅️  {} {} -> {} ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            body.len()
        );

        Ok(SigninResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

fn describe_transport_error(e: reqwest::Error, timeout: Duration) -> DomainError {
    let message = if e.is_timeout() {
        format!("Request timed out after {}s", timeout.as_secs_f64())
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_builder() {
        format!("Invalid request: {}", e)
    } else {
        e.to_string()
    };
    DomainError::Transport(message)
}
