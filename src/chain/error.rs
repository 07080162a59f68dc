use thiserror::Error;

/// Failures talking to the REST server. Carried inside [`ClientError::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS or protocol failure below HTTP.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded into the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl TransportError {
    /// Classify a reqwest error, surfacing timeouts separately.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Http(err)
        }
    }
}

/// Error taxonomy for every client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid BIP39 mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid address `{address}` for prefix `{expected_prefix}`")]
    InvalidAddress {
        address: String,
        expected_prefix: String,
    },

    #[error("bech32 encoding failed: {0}")]
    Encoding(String),

    #[error("bech32 decoding failed: {0}")]
    Decoding(String),

    #[error("no on-chain account for {0}")]
    AccountNotFound(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(
        "parameter `address_from` has to be set, or set a phrase with `set_phrase` to use the address of an imported key"
    )]
    MissingFromAddress,

    #[error("set a phrase with `set_phrase` before signing with an imported key")]
    MissingPrivateKey,

    #[error("vault transfers need a non-empty memo")]
    MissingMemo,

    #[error("invalid coin: {0}")]
    InvalidCoin(String),

    /// Internal bug signal: a freshly produced signature failed to verify.
    #[error("signing invariant violated: {0}")]
    SigningInvariantViolation(String),
}

impl ClientError {
    /// Only transport failures are worth another attempt. A missing account or
    /// an unparseable body will not change on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(TransportError::Http(_) | TransportError::Timeout) => true,
            ClientError::Transport(TransportError::Status { status, .. }) => {
                *status >= 500 || *status == 429
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
