#![warn(missing_docs)]
//! # MiniLyrics-Core
//!
//! MiniLyrics-Core speaks the protocol of the MiniLyrics lyrics search service.
//! It builds the encrypted search request and decodes the encrypted MBXML1
//! reply into a typed list of lyric files. It performs no I/O, sending the
//! bytes is left to the caller.
//!
//! Most callers only need the [`search`] module
//!
//! ```no_run
//! use minilyrics_core::mbxml::DecodeOptions;
//! use minilyrics_core::search;
//!
//! let body = search::encode_query("Queen", "Bohemian Rhapsody").unwrap();
//! // POST body to search::SEARCH_HOST / search::SEARCH_PATH and read the reply
//! # let reply: Vec<u8> = vec![];
//! let response = search::parse_response(&reply, &DecodeOptions::default()).unwrap();
//! for url in response.lyrics_urls() {
//!     println!("{}", url);
//! }
//! ```
//!

/// Contains the request and response envelope and the query document
pub mod envelope;
/// Contains the typed search response
pub mod lyrics;
/// Contains the MBXML1 binary tree format
pub mod mbxml;
/// Contains the high level entry points
pub mod search;

/// This is the top level error structure of the library
///
/// Most calls will either return their `Ok(result)` or this `Err(Error)`
pub use search::Error;
