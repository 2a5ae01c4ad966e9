//! Every request and response is wrapped in the same 22 byte envelope:
//!
//! | Offset | Size | Meaning                                   |
//! |--------|------|-------------------------------------------|
//! | 0      | 1    | Marker, always 0x02                       |
//! | 1      | 1    | XOR key                                   |
//! | 2      | 4    | Reserved, always 0x04 0x00 0x00 0x00      |
//! | 6      | 16   | MD5 of the query text and a fixed salt    |
//! | 22     | ..   | Body, every byte XORed with the key       |
//!
//! The key of a request is the integer mean of its plaintext bytes. Responses
//! pick their own key, which is read back from offset 1.

use cookie_factory::GenError;
use err_derive::Error;

/// Contains the envelope structure and constants
pub mod model;

/// Contains code related to the deserialisation of envelopes
pub mod de;
/// Contains code related to the serialisation of envelopes
pub mod ser;

/// Contains the search request document
pub mod query;

mod crypto;

pub use crypto::derive_key;
pub use de::decrypt_response;
pub use model::{Envelope, HEADER_LEN};
pub use query::SearchQuery;

/// The error types used when building or opening envelopes
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Raised when a query has neither an artist nor a title
    #[error(display = "A query needs an artist or a title")]
    InvalidQuery,
    /// Raised when a response cannot even hold the envelope prefix
    #[error(display = "Response of {} bytes is shorter than the envelope", len)]
    TruncatedResponse {
        /// Number of bytes that were received
        len: usize,
    },
    /// A Cookie Factor GenError
    #[error(display = "Cookie GenError")]
    GenError(#[error(source)] std::sync::Arc<GenError>),
}

impl From<GenError> for Error {
    fn from(k: GenError) -> Self {
        Error::GenError(std::sync::Arc::new(k))
    }
}
