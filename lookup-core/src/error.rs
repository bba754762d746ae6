use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong between sending the request and holding a
/// parsed JSON value.
///
/// Callers show one message for every variant; the variant only matters for
/// the diagnostic log.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request for {path} did not complete")]
    Fetch {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("response body is not valid JSON")]
    Parse(#[from] serde_json::Error),
}

impl LookupError {
    pub fn fetch(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        LookupError::Fetch { path: path.into(), source: source.into() }
    }
}
