use common::identity::Identity;
use common::ledger::LedgerError;
use reqwest::StatusCode;

use crate::ledger_api::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
}

impl ApiError {
    /// Translate a failed call back into the ledger's own error.
    ///
    /// `owner` is the identity whose files were being read, if any; the
    /// server does not echo it back on a 403.
    pub fn into_ledger_error(self, owner: Option<&Identity>) -> LedgerError {
        let (status, text) = match self {
            ApiError::HttpStatus(status, text) => (status, text),
            other => return LedgerError::Unreachable(other.to_string()),
        };
        let body = serde_json::from_str::<ErrorBody>(&text).ok();

        match status {
            StatusCode::UNAUTHORIZED => LedgerError::Unauthenticated,
            StatusCode::BAD_REQUEST => {
                let field = body.as_ref().and_then(|b| b.field.as_deref());
                LedgerError::InvalidInput(static_field(field))
            }
            StatusCode::FORBIDDEN => LedgerError::AccessDenied {
                owner: owner.cloned().unwrap_or_default(),
            },
            StatusCode::CONFLICT => {
                LedgerError::Rejected(body.map(|b| b.message).unwrap_or(text))
            }
            _ => LedgerError::Unreachable(match body {
                Some(b) => b.message,
                None => format!("HTTP status {}", status),
            }),
        }
    }
}

fn static_field(field: Option<&str>) -> &'static str {
    match field {
        Some("owner") => "owner",
        Some("url") => "url",
        Some("user") => "user",
        Some("grantee") => "grantee",
        Some("target") => "target",
        _ => "input",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: StatusCode, body: &str) -> LedgerError {
        ApiError::HttpStatus(code, body.to_string()).into_ledger_error(Some(&Identity::from("0xA")))
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(StatusCode::UNAUTHORIZED, ""), LedgerError::Unauthenticated);
        assert_eq!(
            status(StatusCode::FORBIDDEN, ""),
            LedgerError::AccessDenied {
                owner: Identity::from("0xA")
            }
        );
        assert_eq!(
            status(
                StatusCode::BAD_REQUEST,
                r#"{"kind":"invalid_input","message":"x","field":"url"}"#
            ),
            LedgerError::InvalidInput("url")
        );
        assert_eq!(
            status(StatusCode::CONFLICT, r#"{"kind":"rejected","message":"user denied"}"#),
            LedgerError::Rejected("user denied".to_string())
        );
        assert_eq!(
            status(StatusCode::SERVICE_UNAVAILABLE, r#"{"kind":"unreachable","message":"down"}"#),
            LedgerError::Unreachable("down".to_string())
        );
    }

    #[test]
    fn test_unparseable_bodies() {
        assert_eq!(status(StatusCode::BAD_REQUEST, "nope"), LedgerError::InvalidInput("input"));
        assert!(matches!(
            status(StatusCode::INTERNAL_SERVER_ERROR, "<html>"),
            LedgerError::Unreachable(_)
        ));
    }
}
