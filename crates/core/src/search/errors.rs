use err_derive::Error;

/// This is the primary error type of the library
///
/// Every variant wraps the error of the stage that failed
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Error raised while building a query or opening a response envelope
    #[error(display = "Envelope error")]
    Envelope(#[error(source)] crate::envelope::Error),

    /// Error raised during deserialization of the response tree
    #[error(display = "Deserialization error")]
    Deserialization(#[error(source)] crate::mbxml::de::Error),

    /// Raised when the tree is not a search reply
    #[error(display = "Mapping error")]
    Mapping(#[error(source)] crate::lyrics::Error),
}
