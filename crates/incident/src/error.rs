use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Errors produced while fetching incidents.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Bad or missing input, detected before any request is sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Missing credentials or a credential rejected by the service.
    #[error("authentication failed: {message}")]
    Authentication {
        /// HTTP status returned by the service, if a request was made
        status: Option<StatusCode>,
        /// Human-readable reason
        message: String,
    },
    /// Network failure or unusable response from the service.
    #[error(transparent)]
    RemoteService(#[from] RemoteError),
}

impl FetchError {
    /// Process exit code for this error.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument(_) => 2,
            Self::Authentication { .. } => 3,
            Self::RemoteService(_) => 1,
        }
    }

    /// Whether the failed request may succeed if attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RemoteService(err) => err.is_retryable(),
            Self::InvalidArgument(_) | Self::Authentication { .. } => false,
        }
    }
}

/// Failures talking to the remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    /// The request never produced a response.
    #[error("request to {url} failed")]
    Transport {
        /// Requested URL
        url: Url,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status.
    #[error("{url} responded with {status}: {body}")]
    Status {
        /// Requested URL
        url: Url,
        /// Response status
        status: StatusCode,
        /// Response body, possibly empty
        body: String,
    },
    /// The response body was not a valid incidents page.
    #[error("failed to decode response from {url}")]
    Decode {
        /// Requested URL
        url: Url,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
    /// A pagination link could not be parsed.
    #[error("invalid pagination link {link:?}")]
    InvalidLink {
        /// Link as sent by the service
        link: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },
    /// A pagination link pointed at a page already fetched.
    #[error("pagination loop detected at {0}")]
    PaginationLoop(Url),
}

impl RemoteError {
    /// Connection errors, timeouts, 5xx and 429 are transient; everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Client(_)
            | Self::Decode { .. }
            | Self::InvalidLink { .. }
            | Self::PaginationLoop(_) => false,
        }
    }
}
