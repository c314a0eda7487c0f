use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a configured request body is sent with this verb.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(DomainError::Validation(format!(
                "Unsupported HTTP method: {}",
                other
            ))),
        }
    }
}

/// Comma-separated success keywords, matched case-insensitively against a response body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuccessKeywords(Vec<String>);

impl SuccessKeywords {
    pub fn parse(raw: Option<&str>) -> Self {
        let keywords = raw
            .unwrap_or_default()
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self(keywords)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }

    /// True when at least one keyword occurs in `body`.
    pub fn matches(&self, body: &str) -> bool {
        let haystack = body.to_lowercase();
        self.0.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Request body with `{{timestamp}}` and `{{date}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBodyTemplate(String);

impl RequestBodyTemplate {
    pub const TIMESTAMP: &'static str = "{{timestamp}}";
    pub const DATE: &'static str = "{{date}}";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        self.0
            .replace(Self::TIMESTAMP, &now.timestamp_millis().to_string())
            .replace(Self::DATE, &now.format("%Y-%m-%d").to_string())
    }

    /// Renders the template and parses it as JSON.
    pub fn render_json(&self, now: DateTime<Utc>) -> Result<serde_json::Value, DomainError> {
        let rendered = self.render(now);
        serde_json::from_str(&rendered).map_err(|e| {
            DomainError::InvalidInput(format!("Request body is not valid JSON: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn method_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(" Patch ".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("TRACE".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::default(), HttpMethod::Post);
    }

    #[test]
    fn only_write_verbs_carry_a_body() {
        assert!(HttpMethod::Post.carries_body());
        assert!(HttpMethod::Put.carries_body());
        assert!(HttpMethod::Patch.carries_body());
        assert!(!HttpMethod::Get.carries_body());
        assert!(!HttpMethod::Delete.carries_body());
    }

    #[test]
    fn keywords_drop_blanks_and_lowercase() {
        let keywords = SuccessKeywords::parse(Some(" OK, ,Success ,"));
        assert_eq!(keywords.keywords(), &["ok".to_string(), "success".to_string()]);
    }

    #[test]
    fn keyword_match_ignores_case() {
        let keywords = SuccessKeywords::parse(Some("ok,success"));
        assert!(keywords.matches(r#"{"result":"SUCCESS"}"#));
        assert!(!keywords.matches(r#"{"result":"denied"}"#));
    }

    #[test]
    fn missing_keyword_is_empty() {
        assert!(SuccessKeywords::parse(None).is_empty());
        assert!(SuccessKeywords::parse(Some("  ")).is_empty());
    }

    #[test]
    fn template_substitutes_every_placeholder() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 1, 2, 3).unwrap();
        let template =
            RequestBodyTemplate::new(r#"{"ts":{{timestamp}},"day":"{{date}}","again":"{{date}}"}"#);

        let rendered = template.render(now);

        assert_eq!(
            rendered,
            format!(
                r#"{{"ts":{},"day":"2024-03-05","again":"2024-03-05"}}"#,
                now.timestamp_millis()
            )
        );
        let json = template.render_json(now).unwrap();
        assert_eq!(json["ts"], serde_json::json!(now.timestamp_millis()));
    }

    #[test]
    fn malformed_template_is_reported_not_panicked() {
        let template = RequestBodyTemplate::new("{not json {{date}}");
        let err = template.render_json(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
