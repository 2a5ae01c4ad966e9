use super::crypto;
use super::model::*;
use super::Error;
use log::*;

const PROLOG: &str = "<?xml version='1.0' encoding='utf-8' ?>";

/// A lyrics search request
///
/// At least one of the artist and the title is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    artist: String,
    title: String,
}

impl SearchQuery {
    /// Build a query, fails with [`Error::InvalidQuery`] when both fields are empty
    pub fn new<A: Into<String>, T: Into<String>>(artist: A, title: T) -> Result<Self, Error> {
        let artist = artist.into();
        let title = title.into();
        if artist.is_empty() && title.is_empty() {
            return Err(Error::InvalidQuery);
        }
        Ok(Self { artist, title })
    }

    /// The artist to search for, possibly empty
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// The title to search for, possibly empty
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The plaintext request document
    ///
    /// The attribute order is fixed, the service expects exactly this shape.
    /// Artist and title go in verbatim, without XML escaping, as the official
    /// client sends them.
    pub fn document(&self) -> String {
        format!(
            "{}<searchV1 filetype=\"lyrics\" ClientCharEncoding=\"utf-8\" artist=\"{}\" title=\"{}\" OnlyMatched=\"1\" client=\"MiniLyrics\" RequestPage=\"0\" />",
            PROLOG,
            self.artist,
            self.title,
        )
    }

    /// Encrypt the document and wrap it in an envelope
    pub fn to_envelope(&self) -> Result<Envelope, Error> {
        let document = self.document();
        let plaintext = document.as_bytes();
        // The prolog alone makes the document non-empty
        let key = crypto::derive_key(plaintext).ok_or(Error::InvalidQuery)?;
        let digest = query_digest(plaintext);
        debug!(
            "Query for artist {:?} title {:?}: {} bytes, key {:#04x}",
            self.artist,
            self.title,
            plaintext.len(),
            key
        );
        Ok(Envelope::seal(key, digest, plaintext))
    }

    /// The request body to send to the search service
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        self.to_envelope()?.serialize(vec![])
    }
}
