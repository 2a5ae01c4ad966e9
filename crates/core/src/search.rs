//! The entry points used by transports, proxies and player plugins
//!
//! A search is a single POST of [`encode_query`]'s output to
//! [`SEARCH_HOST`]`/`[`SEARCH_PATH`] with the [`USER_AGENT`] header. The body
//! of the reply goes to [`parse_response`], or through [`decode_response`] and
//! [`map_result`] separately when the raw tree is wanted too.
//!
//! Nothing here performs I/O or keeps state between calls.

use crate::envelope::{self, SearchQuery};
use crate::lyrics::SearchResponse;
use crate::mbxml::{DecodeOptions, GenericNode};
use log::*;

mod errors;

pub use errors::Error;

/// Result type of the search facade
pub type Result<T> = std::result::Result<T, Error>;

/// Host of the search service
pub const SEARCH_HOST: &str = "search.crintsoft.com";
/// Path the query envelope is POSTed to
pub const SEARCH_PATH: &str = "/searchlyrics.htm";
/// The service only answers this user agent
pub const USER_AGENT: &str = "MiniLyrics";

/// Build the request body for a search
///
/// Either field may be empty, but not both.
pub fn encode_query(artist: &str, title: &str) -> Result<Vec<u8>> {
    let query = SearchQuery::new(artist, title)?;
    Ok(query.encode()?)
}

/// Decrypt and decode a reply body with the default limits
pub fn decode_response(buf: &[u8]) -> Result<GenericNode> {
    decode_response_with(buf, &DecodeOptions::default())
}

/// Decrypt and decode a reply body
pub fn decode_response_with(buf: &[u8], options: &DecodeOptions) -> Result<GenericNode> {
    let stream = envelope::decrypt_response(buf)?;
    trace!("Decrypted {} byte tree stream", stream.len());
    Ok(GenericNode::deserialize(&stream, options)?)
}

/// Project a decoded tree onto the typed response
pub fn map_result(root: &GenericNode) -> Result<SearchResponse> {
    Ok(SearchResponse::from_node(root)?)
}

/// Decrypt, decode and map a reply body in one go
pub fn parse_response(buf: &[u8], options: &DecodeOptions) -> Result<SearchResponse> {
    let root = decode_response_with(buf, options)?;
    let response = map_result(&root)?;
    debug!(
        "Search returned {} with {} items",
        response.result.as_str(),
        response.items().len()
    );
    Ok(response)
}
