//! The typed view of a search reply
//!
//! A reply is a `return` element whose attributes describe the search and
//! whose `fileinfo` children each describe one lyric file. The lyric text of
//! an item lives at `server_url + link`.

use err_derive::Error;

/// Contains the typed response structures
pub mod model;

/// Contains the projection from the generic tree
pub mod mapper;

pub use model::{LyricsItem, ResultCode, SearchResponse};

/// The error types used while mapping a tree onto the typed response
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The root element is not a search reply
    #[error(display = "Expected a return element, got {}", _0)]
    UnexpectedRootType(String),
}
