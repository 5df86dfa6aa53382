use std::error::Error;
use std::fmt;

use serde::Deserialize;

use crate::{ApiError, ApiErrorKind};

#[derive(Debug)]
pub enum ApiClientError {
    Url(url::ParseError),
    Reqwest(reqwest::Error),
}

impl fmt::Display for ApiClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiClientError::Url(_) => write!(f, "ApiClientError::Url"),
            ApiClientError::Reqwest(_) => write!(f, "ApiClientError::Reqwest"),
        }
    }
}

impl Error for ApiClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiClientError::Url(v) => Some(v),
            ApiClientError::Reqwest(v) => Some(v),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl RequestError {
    pub fn as_api(self) -> Result<ApiError, RequestError> {
        match self {
            RequestError::Api(v) => Ok(v),
            other => Err(other)
        }
    }

    /// builds an error from a response that did not have the expected
    /// status. the body is read for a message but a body that cannot be
    /// read still produces an error for the status.
    pub(crate) async fn from_response(res: reqwest::Response) -> RequestError {
        let status = res.status();
        let kind = ApiErrorKind::from_status(status.as_u16());

        let msg = match res.bytes().await {
            Ok(body) => detail_message(&body),
            Err(err) => {
                tracing::debug!("failed to read error body: {err}");
                None
            }
        };

        let msg = msg.unwrap_or_else(|| {
            status.canonical_reason()
                .unwrap_or("request failed")
                .to_owned()
        });

        RequestError::Api(ApiError::from((kind, msg)))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// the store reports errors as `{"detail": "..."}` or, for rejected bodies,
/// `{"detail": [{"msg": "..."}]}`
fn detail_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;

    match parsed.detail? {
        serde_json::Value::String(msg) => Some(msg),
        serde_json::Value::Array(list) => {
            let msgs: Vec<String> = list.iter()
                .filter_map(|v| v.get("msg").and_then(|m| m.as_str()))
                .map(|m| m.to_owned())
                .collect();

            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join(", "))
            }
        },
        serde_json::Value::Null => None,
        other => Some(other.to_string())
    }
}
