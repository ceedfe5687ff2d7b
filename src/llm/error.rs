//! Generation failure classification
//!
//! Every backend maps its failures onto the four [`FailureKind`]s so callers
//! can decide on retries without knowing which service they talked to.

use std::fmt;
use std::time::Duration;

/// Classified kind of a generation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Invalid or missing credential
    Auth,
    /// Service asked the caller to slow down
    RateLimited,
    /// Network failure, timeout or server-side error
    TransientService,
    /// Prompt rejected by the service
    InvalidRequest,
}

impl FailureKind {
    pub fn is_retriable(self) -> bool {
        matches!(self, FailureKind::RateLimited | FailureKind::TransientService)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Auth => "AuthError",
            FailureKind::RateLimited => "RateLimited",
            FailureKind::TransientService => "TransientServiceError",
            FailureKind::InvalidRequest => "InvalidRequestError",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during a generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Authentication failed or the credential is missing
    Auth { message: String },

    /// Rate limit exceeded, optionally with a server-suggested delay
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Network error, timeout, 5xx or unusable response body
    TransientService {
        message: String,
        status_code: Option<u16>,
    },

    /// The service rejected the request (malformed, over a hard limit, ...)
    InvalidRequest {
        message: String,
        status_code: Option<u16>,
    },
}

impl GenerationError {
    pub fn auth(message: impl Into<String>) -> Self {
        GenerationError::Auth {
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        GenerationError::TransientService {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        GenerationError::InvalidRequest {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::transient(format!(
            "Request timed out after {} seconds",
            timeout.as_secs()
        ))
    }

    /// Maps an HTTP status code onto a failure kind.
    ///
    /// 401/403 are auth failures, 429 is a rate limit, 408 and 5xx are
    /// transient, every other status is an invalid request.
    pub fn from_status(status: u16, message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => GenerationError::Auth { message },
            429 => GenerationError::RateLimited {
                message,
                retry_after,
            },
            408 | 500..=599 => GenerationError::TransientService {
                message,
                status_code: Some(status),
            },
            _ => GenerationError::InvalidRequest {
                message,
                status_code: Some(status),
            },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            GenerationError::Auth { .. } => FailureKind::Auth,
            GenerationError::RateLimited { .. } => FailureKind::RateLimited,
            GenerationError::TransientService { .. } => FailureKind::TransientService,
            GenerationError::InvalidRequest { .. } => FailureKind::InvalidRequest,
        }
    }

    pub fn is_retriable(&self) -> bool {
        self.kind().is_retriable()
    }

    pub fn message(&self) -> &str {
        match self {
            GenerationError::Auth { message }
            | GenerationError::RateLimited { message, .. }
            | GenerationError::TransientService { message, .. }
            | GenerationError::InvalidRequest { message, .. } => message,
        }
    }

    /// Delay suggested by the service before resubmitting, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GenerationError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Auth { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            GenerationError::RateLimited {
                message,
                retry_after,
            } => {
                if let Some(delay) = retry_after {
                    write!(
                        f,
                        "Rate limit exceeded, retry after {} seconds: {}",
                        delay.as_secs(),
                        message
                    )
                } else {
                    write!(f, "Rate limit exceeded: {}", message)
                }
            }
            GenerationError::TransientService {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Service error ({}): {}", code, message)
                } else {
                    write!(f, "Service error: {}", message)
                }
            }
            GenerationError::InvalidRequest {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Invalid request ({}): {}", code, message)
                } else {
                    write!(f, "Invalid request: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl crate::retry::Retriable for GenerationError {
    fn is_retriable(&self) -> bool {
        self.kind().is_retriable()
    }

    fn retry_after(&self) -> Option<Duration> {
        GenerationError::retry_after(self)
    }
}
