use chrono::{DateTime, Utc};
use log::warn;

use signdock_domain::account::Account;
use signdock_domain::signin::SigninRequest;
use signdock_infrastructure::http::USER_AGENT;

const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";

/// Builds the outbound request for `account`.
///
/// Header precedence: defaults, then the account's custom headers, then `Cookie`.
/// A body is attached only for verbs that carry one.
pub(super) fn build_request(account: &Account, now: DateTime<Utc>) -> SigninRequest {
    let mut headers = HeaderList::default();
    headers.set("User-Agent", USER_AGENT);
    headers.set("Accept", DEFAULT_ACCEPT);

    if let Some(raw) = account.headers() {
        match parse_custom_headers(raw) {
            Ok(custom) => {
                for (name, value) in custom {
                    headers.set(&name, &value);
                }
            }
            Err(e) => warn!(
                "[{}] Ignoring custom headers, keeping defaults: {}",
                account.name(),
                e
            ),
        }
    }

    if !account.cookies().is_empty() {
        headers.set("Cookie", account.cookies());
    }

    let body = if account.method().carries_body() {
        account
            .request_body()
            .and_then(|template| match template.render_json(now) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("[{}] Sending without body: {}", account.name(), e);
                    None
                }
            })
    } else {
        None
    };

    if body.is_some() && !headers.contains("Content-Type") {
        headers.set("Content-Type", "application/json");
    }

    SigninRequest {
        method: account.method(),
        url: account.signin_url().to_string(),
        headers: headers.into_inner(),
        body,
    }
}

/// Parses a JSON object of header name to value. Scalars are stringified;
/// nested values and nulls are dropped.
fn parse_custom_headers(raw: &str) -> Result<Vec<(String, String)>, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))?;

    let serde_json::Value::Object(map) = value else {
        return Err("headers must be a JSON object".to_string());
    };

    Ok(map
        .into_iter()
        .filter_map(|(name, value)| match value {
            serde_json::Value::String(s) => Some((name, s)),
            serde_json::Value::Number(n) => Some((name, n.to_string())),
            serde_json::Value::Bool(b) => Some((name, b.to_string())),
            _ => None,
        })
        .collect())
}

/// Ordered header list with case-insensitive replacement.
#[derive(Default)]
struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    fn set(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(entry) => *entry = (name.to_string(), value.to_string()),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }
}
