use thiserror::Error;

/// Failures of the pure link codec. Each one is fatal to the single
/// encode/decode call that produced it and carries no partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The domain prefix is not an `https` URL.
    #[error("domain prefix must use https: {0:?}")]
    InvalidDomainPrefix(String),

    /// The flat parameter bag has no `link` key, or its value is not a URL.
    #[error("missing or unparsable target link")]
    MissingTargetLink,
}

/// Failures surfaced by the client facade and its transport.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("project id is not configured")]
    ProjectIdMissing,

    #[error("link is not handled by this client: {0}")]
    NotRecognized(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("could not parse server response: {0}")]
    ResponseParse(String),

    #[error(transparent)]
    Link(#[from] LinkError),
}
