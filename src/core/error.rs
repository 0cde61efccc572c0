use std::fmt;

use thiserror::Error;

/// Category of an upstream failure, fixed once at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Unauthenticated,
    InsufficientBalance,
    InvalidParameters,
    ApiError,
    Timeout,
    Transport,
    NotFound,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unauthenticated => "unauthenticated",
            FailureKind::InsufficientBalance => "insufficient_balance",
            FailureKind::InvalidParameters => "invalid_parameters",
            FailureKind::ApiError => "api_error",
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
            FailureKind::NotFound => "not_found",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure of a single upstream call (or of a lookup stage).
///
/// `Display` yields the one-line, human-readable explanation that tools
/// prefix with the name of the failing operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl ApiFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            FailureKind::Unauthenticated,
            "SOCIALDATA_API_KEY is not set; set the environment variable and retry.",
        )
    }

    pub fn insufficient_balance(body: String) -> Self {
        Self {
            status: Some(402),
            body: Some(body),
            ..Self::new(
                FailureKind::InsufficientBalance,
                "SocialData balance is insufficient; top up the account.",
            )
        }
    }

    pub fn invalid_parameters(body: String) -> Self {
        Self {
            status: Some(422),
            message: format!("invalid parameters: {body}"),
            body: Some(body),
            kind: FailureKind::InvalidParameters,
        }
    }

    pub fn api_error(status: u16, body: String) -> Self {
        Self {
            status: Some(status),
            message: format!("API error {status}: {body}"),
            body: Some(body),
            kind: FailureKind::ApiError,
        }
    }

    pub fn timeout() -> Self {
        Self::new(FailureKind::Timeout, "request timed out; try again later.")
    }

    pub fn transport(cause: impl fmt::Display) -> Self {
        Self::new(FailureKind::Transport, format!("request failed: {cause}"))
    }

    pub fn not_found(what: impl fmt::Display) -> Self {
        Self::new(FailureKind::NotFound, format!("{what} not found"))
    }
}
