use serde::{Serialize, Serializer};

/// The outcome reported in the `result` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultCode {
    /// Matches were found
    Ok,
    /// The search ran but nothing matched
    NotFound,
    /// Any other code, kept verbatim
    Other(String),
}

impl ResultCode {
    /// The code as it appears on the wire
    pub fn as_str(&self) -> &str {
        match self {
            ResultCode::Ok => "OK",
            ResultCode::NotFound => "NOT_FOUND",
            ResultCode::Other(code) => code,
        }
    }
}

impl From<&str> for ResultCode {
    fn from(code: &str) -> Self {
        match code {
            "OK" => ResultCode::Ok,
            "NOT_FOUND" => ResultCode::NotFound,
            other => ResultCode::Other(other.to_string()),
        }
    }
}

impl Default for ResultCode {
    fn default() -> Self {
        ResultCode::Other(String::new())
    }
}

impl Serialize for ResultCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The typed form of a search reply
///
/// Serialises with the same field names the service uses so proxies can pass
/// it on as JSON unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SearchResponse {
    /// Element name of the root, always `return`
    #[serde(rename = "_type")]
    pub node_type: String,
    /// Echo of the command the server ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orgcmd: Option<String>,
    /// Outcome of the search
    pub result: ResultCode,
    /// Service specific status, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badrc: Option<String>,
    /// Service specific flag, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ls_dd: Option<String>,
    /// Base URL every [`LyricsItem::link`] is relative to
    pub server_url: String,
    /// The usable `fileinfo` children, `None` when the reply has no child block
    #[serde(rename = "children", skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LyricsItem>>,
}

impl SearchResponse {
    /// True when the service reported `OK`
    pub fn is_ok(&self) -> bool {
        self.result == ResultCode::Ok
    }

    /// The items as a slice, empty when there is no child block
    pub fn items(&self) -> &[LyricsItem] {
        self.items.as_deref().unwrap_or(&[])
    }

    /// Absolute URL of every item's lyric text, in item order
    pub fn lyrics_urls(&self) -> impl Iterator<Item = String> + '_ {
        self.items()
            .iter()
            .map(move |item| item.lyrics_url(&self.server_url))
    }
}

/// One lyric file offered by the service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LyricsItem {
    /// Element name of the child, always `fileinfo`
    #[serde(rename = "_type")]
    pub node_type: String,
    /// Path of the lyric text relative to [`SearchResponse::server_url`]
    pub link: String,
    /// Artist as stored by the uploader
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Track title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Album name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Name of the user who uploaded the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    /// Average rating, kept as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    /// Number of ratings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratecount: Option<u64>,
    /// How often the file was downloaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
    /// Track length in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timelength: Option<u64>,
}

impl LyricsItem {
    /// Where to fetch the lyric text from
    ///
    /// This is a plain concatenation. The link is never normalised.
    pub fn lyrics_url(&self, server_url: &str) -> String {
        format!("{}{}", server_url, self.link)
    }
}

#[test]
fn test_result_code() {
    assert_eq!(ResultCode::from("OK"), ResultCode::Ok);
    assert_eq!(ResultCode::from("NOT_FOUND"), ResultCode::NotFound);
    assert_eq!(
        ResultCode::from("BUSY"),
        ResultCode::Other("BUSY".to_string())
    );
    assert_eq!(ResultCode::from("BUSY").as_str(), "BUSY");
}

#[test]
fn test_lyrics_url_is_concatenation() {
    let item = LyricsItem {
        link: "/l/a%20b.lrc".to_string(),
        ..Default::default()
    };
    assert_eq!(
        item.lyrics_url("http://search.crintsoft.com"),
        "http://search.crintsoft.com/l/a%20b.lrc"
    );
    // No slash is added or removed
    assert_eq!(item.lyrics_url("http://x/"), "http://x//l/a%20b.lrc");
    assert_eq!(item.lyrics_url(""), "/l/a%20b.lrc");
}
