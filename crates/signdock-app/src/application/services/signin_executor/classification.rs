use signdock_domain::account::SuccessKeywords;
use signdock_domain::signin::SigninResponse;

/// Verdict on a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Verdict {
    pub success: bool,
    pub message: String,
}

/// Status outside `[200, 400)` fails outright. Otherwise any configured keyword
/// must appear in the full body; with no keywords the status alone decides.
pub(super) fn classify(response: &SigninResponse, keywords: &SuccessKeywords) -> Verdict {
    if !response.is_success_status() {
        return Verdict {
            success: false,
            message: format!(
                "Sign-in failed: HTTP {} {}",
                response.status, response.status_text
            )
            .trim_end()
            .to_string(),
        };
    }

    if keywords.is_empty() {
        return Verdict {
            success: true,
            message: format!("Sign-in succeeded (HTTP {})", response.status),
        };
    }

    if keywords.matches(&response.body) {
        Verdict {
            success: true,
            message: format!(
                "Sign-in succeeded (HTTP {}, matched success keyword)",
                response.status
            ),
        }
    } else {
        Verdict {
            success: false,
            message: "Sign-in failed: response did not contain any success keyword".to_string(),
        }
    }
}

pub(super) fn transport_failure(reason: &str) -> String {
    format!("Request failed: {}", reason)
}

/// First `limit` characters of `body`, cut on a char boundary.
pub(super) fn preview(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
