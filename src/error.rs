use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The supplied group element was malformed")]
    MalformedElement,
    #[error("The supplied ciphertext was malformed")]
    MalformedCiphertext,
    #[error("The principal id must be 1 to {max} bytes of UTF-8")]
    InvalidPrincipal { max: usize },
    #[error("Frame of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),
    #[error("Unknown command {0:?}")]
    UnknownCommand(String),
    #[error("Relay is not ready: {0}")]
    NotReady(&'static str),
    #[error("No public key registered for {0:?}")]
    UnknownPrincipal(String),
    #[error("Ciphertext is for {ciphertext:?} but the re-encryption key is for {rekey:?}")]
    PrincipalMismatch { ciphertext: String, rekey: String },
    #[error("No ciphertext is stored for {0:?}")]
    NoCiphertextFor(String),
    #[error("Ciphertext verification failed")]
    VerificationFailed,
    #[error("The relay rejected the request: {0}")]
    Rejected(String),
    #[error("Unexpected response status {0:?}")]
    UnexpectedStatus(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a refusal that the relay reports back to its peer, as opposed to a
    /// transport failure that simply ends the connection.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::NotReady(_)
                | Error::UnknownPrincipal(_)
                | Error::PrincipalMismatch { .. }
                | Error::NoCiphertextFor(_)
                | Error::VerificationFailed
                | Error::MalformedElement
                | Error::InvalidPrincipal { .. }
        )
    }
}

pub type Result<V, E = Error> = std::result::Result<V, E>;
