use thiserror::Error;

/// Errors surfaced by the library.
///
/// An unmatched country name is **not** an error: the coder reports it as `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// The API answered, but with a non-success status or an error payload.
    #[error("APIError: {}{message} ({url})", .status.map(|s| format!("[{s}] ")).unwrap_or_default())]
    Api {
        url: String,
        message: String,
        status: Option<u16>,
    },

    /// The API answered with something we could not decode or did not recognize.
    #[error("APIResponseError: {message} ({url})")]
    Response { url: String, message: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("network error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// An override catalog entry is malformed. Nothing from that catalog is usable.
    #[error("invalid override for {code}: {reason}")]
    Configuration { code: String, reason: String },

    /// The override catalog is not a valid YAML mapping.
    #[error("override catalog: {0}")]
    Catalog(#[from] serde_yaml::Error),

    /// The database has no concept by that name.
    #[error("concept {concept:?} not found in database {db}")]
    UnknownConcept { concept: String, db: u32 },

    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Populating a reference table failed; the cache for it stays empty.
    #[error("failed to load {resource}")]
    Upstream {
        resource: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn configuration(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Configuration {
            code: code.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn upstream(resource: impl Into<String>, source: Error) -> Self {
        Error::Upstream {
            resource: resource.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_matches_client_convention() {
        let e = Error::Api {
            url: "https://x/v2/en/country".into(),
            message: "Not Found".into(),
            status: Some(404),
        };
        assert_eq!(e.to_string(), "APIError: [404] Not Found (https://x/v2/en/country)");

        let e = Error::Api {
            url: "u".into(),
            message: "120: Invalid value".into(),
            status: None,
        };
        assert_eq!(e.to_string(), "APIError: 120: Invalid value (u)");
    }
}
