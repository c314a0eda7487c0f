use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;

use signdock_domain::account::HttpMethod;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

pub(super) fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Builds a header map, dropping entries that are not valid HTTP header names or values.
pub(super) fn build_header_map(headers: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        let header_name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("Skipping invalid header name '{}': {}", name, e);
                continue;
            }
        };
        let header_value = match HeaderValue::from_str(value) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Skipping invalid value for header '{}': {}", name, e);
                continue;
            }
        };
        map.insert(header_name, header_value);
    }

    map
}
