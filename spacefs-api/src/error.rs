use serde::{Serialize, Deserialize};
use strum::{AsRefStr as StrumAsRefStr};

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum AuthKind {
    PermissionDenied,
    Unauthenticated,
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum GeneralKind {
    InternalFailure,
    Timeout,
    Unavailable,

    AlreadyExists,
    NotFound,

    ValidationFailed,
    InvalidData,
    TooLarge,

    InvalidMethod,
    InvalidRequest,
}

impl std::fmt::Display for GeneralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    Serialize, Deserialize
)]
pub enum ApiErrorKind {
    General(GeneralKind),
    Auth(AuthKind),
}

impl ApiErrorKind {
    /// maps the status code of a failed store response onto an error kind
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => GeneralKind::InvalidRequest.into(),
            401 => AuthKind::Unauthenticated.into(),
            403 => AuthKind::PermissionDenied.into(),
            404 | 410 => GeneralKind::NotFound.into(),
            405 => GeneralKind::InvalidMethod.into(),
            408 | 504 => GeneralKind::Timeout.into(),
            409 => GeneralKind::AlreadyExists.into(),
            413 => GeneralKind::TooLarge.into(),
            422 => GeneralKind::ValidationFailed.into(),
            502 | 503 => GeneralKind::Unavailable.into(),
            _ => GeneralKind::InternalFailure.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiErrorKind::General(GeneralKind::NotFound))
    }

    /// the request itself was rejected for its content, retrying the same
    /// request will not help
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiErrorKind::General(GeneralKind::InvalidRequest) |
            ApiErrorKind::General(GeneralKind::AlreadyExists) |
            ApiErrorKind::General(GeneralKind::ValidationFailed) |
            ApiErrorKind::General(GeneralKind::InvalidData) |
            ApiErrorKind::General(GeneralKind::TooLarge)
        )
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorKind::General(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Auth(v) => std::fmt::Display::fmt(v, f),
        }
    }
}

impl From<GeneralKind> for ApiErrorKind {
    fn from(v: GeneralKind) -> Self {
        ApiErrorKind::General(v)
    }
}

impl From<AuthKind> for ApiErrorKind {
    fn from(v: AuthKind) -> Self {
        ApiErrorKind::Auth(v)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    kind: ApiErrorKind,
    msg: Option<String>,
}

impl ApiError {
    pub fn new() -> Self {
        ApiError {
            kind: ApiErrorKind::General(GeneralKind::InternalFailure),
            msg: None
        }
    }

    pub fn with_kind<K>(mut self, kind: K) -> Self
    where
        K: Into<ApiErrorKind>
    {
        self.kind = kind.into();
        self
    }

    pub fn with_message<M>(mut self, msg: M) -> Self
    where
        M: Into<String>
    {
        self.msg = Some(msg.into());
        self
    }

    pub fn kind(&self) -> &ApiErrorKind {
        &self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref()
    }
}

impl std::default::Default for ApiError {
    fn default() -> Self {
        ApiError::new()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(msg) = &self.msg {
            write!(f, ": {}", msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl<K> From<K> for ApiError
where
    K: Into<ApiErrorKind>
{
    fn from(kind: K) -> Self {
        ApiError {
            kind: kind.into(),
            msg: None
        }
    }
}

impl<K, M> From<(K, M)> for ApiError
where
    K: Into<ApiErrorKind>,
    M: Into<String>,
{
    fn from((kind, msg): (K, M)) -> Self {
        ApiError {
            kind: kind.into(),
            msg: Some(msg.into())
        }
    }
}
