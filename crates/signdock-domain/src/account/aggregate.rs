use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{HttpMethod, RequestBodyTemplate, SuccessKeywords};
use crate::shared::{AccountId, DomainError};

/// Editable part of an account, as supplied on creation or import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub name: String,
    pub signin_url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub cookies: String,
    /// Raw JSON object of extra headers; parsed per attempt so a bad value never blocks one.
    #[serde(default)]
    pub headers: Option<String>,
    #[serde(default)]
    pub request_body: Option<String>,
    #[serde(default)]
    pub success_keyword: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl AccountProfile {
    pub fn new(
        name: impl Into<String>,
        signin_url: impl Into<String>,
        cookies: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            signin_url: signin_url.into(),
            method: HttpMethod::default(),
            cookies: cookies.into(),
            headers: None,
            request_body: None,
            success_keyword: None,
            description: None,
            enabled: true,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }

        if self.signin_url.trim().is_empty() {
            return Err(DomainError::Validation(
                "Sign-in URL cannot be empty".to_string(),
            ));
        }

        let url = url::Url::parse(self.signin_url.trim()).map_err(|e| {
            DomainError::Validation(format!("Invalid sign-in URL '{}': {}", self.signin_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::Validation(format!(
                "Sign-in URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.cookies.trim().is_empty() {
            return Err(DomainError::Validation("Cookies are required".to_string()));
        }

        Ok(())
    }

    /// Trims identifying fields and turns blank optionals into `None`.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.signin_url = self.signin_url.trim().to_string();
        self.headers = non_blank(self.headers);
        self.request_body = non_blank(self.request_body);
        self.success_keyword = non_blank(self.success_keyword);
        self.description = non_blank(self.description);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Partial update. For optional profile fields an empty string clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub signin_url: Option<String>,
    pub method: Option<HttpMethod>,
    pub cookies: Option<String>,
    pub headers: Option<String>,
    pub request_body: Option<String>,
    pub success_keyword: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        *self == AccountPatch::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    profile: AccountProfile,
    last_signin_at: Option<DateTime<Utc>>,
    last_signin_status: Option<bool>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    pub fn restore(
        id: AccountId,
        profile: AccountProfile,
        last_signin_at: Option<DateTime<Utc>>,
        last_signin_status: Option<bool>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            profile,
            last_signin_at,
            last_signin_status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &AccountProfile {
        &self.profile
    }

    pub fn signin_url(&self) -> &str {
        &self.profile.signin_url
    }

    pub fn method(&self) -> HttpMethod {
        self.profile.method
    }

    pub fn cookies(&self) -> &str {
        &self.profile.cookies
    }

    pub fn headers(&self) -> Option<&str> {
        self.profile.headers.as_deref()
    }

    pub fn request_body(&self) -> Option<RequestBodyTemplate> {
        self.profile
            .request_body
            .as_deref()
            .map(RequestBodyTemplate::new)
    }

    pub fn success_keywords(&self) -> SuccessKeywords {
        SuccessKeywords::parse(self.profile.success_keyword.as_deref())
    }

    pub fn is_enabled(&self) -> bool {
        self.profile.enabled
    }

    pub fn last_signin_at(&self) -> Option<DateTime<Utc>> {
        self.last_signin_at
    }

    pub fn last_signin_status(&self) -> Option<bool> {
        self.last_signin_status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies `patch` and re-validates; the account is left untouched on error.
    pub fn apply_patch(
        &mut self,
        patch: AccountPatch,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut profile = self.profile.clone();

        if let Some(name) = patch.name {
            profile.name = name;
        }
        if let Some(url) = patch.signin_url {
            profile.signin_url = url;
        }
        if let Some(method) = patch.method {
            profile.method = method;
        }
        if let Some(cookies) = patch.cookies {
            profile.cookies = cookies;
        }
        if let Some(headers) = patch.headers {
            profile.headers = Some(headers);
        }
        if let Some(body) = patch.request_body {
            profile.request_body = Some(body);
        }
        if let Some(keyword) = patch.success_keyword {
            profile.success_keyword = Some(keyword);
        }
        if let Some(description) = patch.description {
            profile.description = Some(description);
        }
        if let Some(enabled) = patch.enabled {
            profile.enabled = enabled;
        }

        let profile = profile.normalized();
        profile.validate()?;

        self.profile = profile;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool, now: DateTime<Utc>) {
        self.profile.enabled = enabled;
        self.updated_at = now;
    }

    pub fn record_signin(&mut self, success: bool, at: DateTime<Utc>) {
        self.last_signin_at = Some(at);
        self.last_signin_status = Some(success);
        self.updated_at = at;
    }
}
