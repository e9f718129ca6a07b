//! Error types for groqchat.
//!
//! Every fallible operation in the crate returns [`Error`].  The variants follow the
//! recovery policy of the chat loop: remote and persistence failures are reported and the
//! loop continues, while configuration failures are fatal only at startup.

use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// The main error type for groqchat.
#[derive(Clone, Debug)]
pub enum Error {
    /// The client was constructed with an empty base URL or API key.
    InvalidParameters {
        /// Human-readable error message.
        message: String,
    },

    /// The provider answered with a status other than 200.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// The response body, verbatim.
        body: String,
    },

    /// The request did not complete within the client timeout.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A response body could not be decoded.
    Decode {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The provider returned no choices or a blank answer.
    EmptyResponse {
        /// Human-readable error message.
        message: String,
    },

    /// A profile is missing, malformed, or fails validation.
    Config {
        /// Human-readable error message.
        message: String,
        /// The profile file involved, if any.
        path: Option<PathBuf>,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// The selection input is not an integer.
    InvalidChoice {
        /// The text the user entered.
        input: String,
    },

    /// The selection index is outside `[0, count)`.
    ChoiceOutOfRange {
        /// The parsed index.
        index: i64,
        /// The number of available entries.
        count: usize,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },
}

impl Error {
    /// Creates a new invalid parameters error.
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Error::InvalidParameters {
            message: message.into(),
        }
    }

    /// Creates a new API error.
    pub fn api(status_code: u16, body: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            body: body.into(),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new decode error.
    pub fn decode(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Decode {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new empty response error.
    pub fn empty_response(message: impl Into<String>) -> Self {
        Error::EmptyResponse {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Error::Config {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Creates a new configuration error caused by `source`.
    pub fn config_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: impl error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Config {
            message: message.into(),
            path,
            source: Some(Arc::new(source)),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new invalid choice error.
    pub fn invalid_choice(input: impl Into<String>) -> Self {
        Error::InvalidChoice {
            input: input.into(),
        }
    }

    /// Creates a new out-of-range choice error.
    pub fn choice_out_of_range(index: i64, count: usize) -> Self {
        Error::ChoiceOutOfRange { index, count }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Returns true if this error is a non-200 API response.
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    /// Returns true if the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Connection { .. } | Error::HttpClient { .. }
        )
    }

    /// Returns true if this error is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Returns true if this error is an empty response.
    pub fn is_empty_response(&self) -> bool {
        matches!(self, Error::EmptyResponse { .. })
    }

    /// Returns true if this error is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. } | Error::Url { .. })
    }

    /// Returns true if this error came from parsing a selection.
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            Error::InvalidChoice { .. } | Error::ChoiceOutOfRange { .. }
        )
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns the response body associated with this error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameters { message } => {
                write!(f, "invalid client parameters: {message}")
            }
            Error::Api { status_code, body } => {
                write!(f, "API error (status {status_code}): {body}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "HTTP request timed out: {message} ({duration} seconds)")
                } else {
                    write!(f, "HTTP request timed out: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "HTTP connection failed: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP request failed: {message}")
            }
            Error::Decode { message, .. } => {
                write!(f, "failed to decode response: {message}")
            }
            Error::EmptyResponse { message } => {
                write!(f, "received empty response from API: {message}")
            }
            Error::Config { message, path, .. } => {
                if let Some(path) = path {
                    write!(f, "invalid configuration ({}): {message}", path.display())
                } else {
                    write!(f, "invalid configuration: {message}")
                }
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::InvalidChoice { input } => {
                write!(f, "invalid choice: {input}")
            }
            Error::ChoiceOutOfRange { index, count } => {
                write!(
                    f,
                    "choice {index} out of range (0-{})",
                    count.saturating_sub(1)
                )
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Decode { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Config { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::decode(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::config_with_source(format!("YAML error: {err}"), None, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for groqchat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_status_and_body() {
        let err = Error::api(429, r#"{"error":"slow down"}"#);
        assert!(err.is_api());
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.body(), Some(r#"{"error":"slow down"}"#));
        assert_eq!(
            err.to_string(),
            r#"API error (status 429): {"error":"slow down"}"#
        );
    }

    #[test]
    fn transport_classification() {
        assert!(Error::timeout("slow", Some(30.0)).is_transport());
        assert!(Error::connection("refused", None).is_transport());
        assert!(Error::http_client("boom", None).is_transport());
        assert!(!Error::api(500, "").is_transport());
        assert!(!Error::decode("bad", None).is_transport());
    }

    #[test]
    fn selection_errors_display() {
        let err = Error::choice_out_of_range(7, 5);
        assert!(err.is_selection());
        assert_eq!(err.to_string(), "choice 7 out of range (0-4)");
        assert_eq!(
            Error::invalid_choice("abc").to_string(),
            "invalid choice: abc"
        );
    }

    #[test]
    fn config_error_mentions_path() {
        let err = Error::config("no models defined", Some(PathBuf::from("/tmp/x.yaml")));
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "invalid configuration (/tmp/x.yaml): no models defined"
        );
    }

    #[test]
    fn yaml_error_keeps_source() {
        let yaml = serde_yaml::from_str::<Vec<String>>("{not: [a list").unwrap_err();
        let err: Error = yaml.into();
        assert!(err.is_config());
        assert!(err.to_string().starts_with("invalid configuration: YAML error:"));
        let source = error::Error::source(&err).expect("yaml source");
        assert!(source.downcast_ref::<serde_yaml::Error>().is_some());
    }

    #[test]
    fn io_error_has_source() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(error::Error::source(&err).is_some());
    }
}
