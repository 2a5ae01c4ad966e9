use super::model::*;
use super::Error;
use crate::mbxml::GenericNode;
use log::*;

pub(super) const ROOT_TYPE: &str = "return";
pub(super) const ITEM_TYPE: &str = "fileinfo";

impl SearchResponse {
    /// Project a decoded tree onto the typed response
    ///
    /// A result other than `OK` still maps successfully, callers decide what an
    /// empty search means to them.
    pub fn from_node(root: &GenericNode) -> Result<SearchResponse, Error> {
        if root.node_type != ROOT_TYPE {
            return Err(Error::UnexpectedRootType(root.node_type.clone()));
        }

        let result = root.attribute("result").map(ResultCode::from);
        if result.is_none() {
            warn!("Search response has no result attribute");
        }
        let server_url = root.attribute("server_url").unwrap_or_default();

        let items = root.children.as_ref().map(|children| {
            children
                .iter()
                .filter_map(LyricsItem::from_node)
                .collect::<Vec<_>>()
        });
        debug!(
            "Search result {:?} with {} of {} items usable",
            result,
            items.as_ref().map_or(0, Vec::len),
            root.children().len()
        );

        Ok(SearchResponse {
            node_type: root.node_type.clone(),
            orgcmd: owned(root, "orgcmd"),
            result: result.unwrap_or_default(),
            badrc: owned(root, "badrc"),
            ls_dd: owned(root, "ls_dd"),
            server_url: server_url.to_string(),
            items,
        })
    }
}

impl LyricsItem {
    /// Project one child of the response, `None` when it cannot be fetched
    pub fn from_node(node: &GenericNode) -> Option<LyricsItem> {
        if node.node_type != ITEM_TYPE {
            warn!("Skipping unexpected {} element", node.node_type);
            return None;
        }
        let link = match node.attribute("link") {
            Some(link) => link.to_string(),
            None => {
                warn!("Skipping {} without a link", node.node_type);
                return None;
            }
        };

        Some(LyricsItem {
            node_type: node.node_type.clone(),
            link,
            artist: owned(node, "artist"),
            title: owned(node, "title"),
            album: owned(node, "album"),
            uploader: owned(node, "uploader"),
            rate: owned(node, "rate"),
            ratecount: numeric(node, "ratecount"),
            downloads: numeric(node, "downloads"),
            timelength: numeric(node, "timelength"),
        })
    }
}

fn owned(node: &GenericNode, key: &str) -> Option<String> {
    node.attribute(key).map(str::to_string)
}

/// Missing and malformed numbers both come back as `None`
fn numeric(node: &GenericNode, key: &str) -> Option<u64> {
    let value = node.attribute(key)?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(e) => {
            debug!("Ignoring {}={:?}: {}", key, value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn item(link: &str) -> GenericNode {
        GenericNode::new("fileinfo").with_attribute("link", link)
    }

    fn response(children: Vec<GenericNode>) -> GenericNode {
        GenericNode::new("return")
            .with_attribute("orgcmd", "searchV1")
            .with_attribute("result", "OK")
            .with_attribute("badrc", "0")
            .with_attribute("ls_dd", "1")
            .with_attribute("server_url", "http://search.crintsoft.com/")
            .with_children(children)
    }

    #[test]
    fn test_full_response() {
        let root = response(vec![item("l/1.lrc")
            .with_attribute("artist", "Queen")
            .with_attribute("title", "Bohemian Rhapsody")
            .with_attribute("album", "A Night at the Opera")
            .with_attribute("uploader", "someone")
            .with_attribute("rate", "4.5")
            .with_attribute("ratecount", "12")
            .with_attribute("downloads", "3456")
            .with_attribute("timelength", "355")]);

        let response = SearchResponse::from_node(&root).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.orgcmd.as_deref(), Some("searchV1"));
        assert_eq!(response.badrc.as_deref(), Some("0"));
        assert_eq!(response.ls_dd.as_deref(), Some("1"));
        assert_eq!(response.server_url, "http://search.crintsoft.com/");

        assert_eq!(
            response.items(),
            &[LyricsItem {
                node_type: "fileinfo".to_string(),
                link: "l/1.lrc".to_string(),
                artist: Some("Queen".to_string()),
                title: Some("Bohemian Rhapsody".to_string()),
                album: Some("A Night at the Opera".to_string()),
                uploader: Some("someone".to_string()),
                rate: Some("4.5".to_string()),
                ratecount: Some(12),
                downloads: Some(3456),
                timelength: Some(355),
            }]
        );
        assert_eq!(
            response.lyrics_urls().collect::<Vec<_>>(),
            vec!["http://search.crintsoft.com/l/1.lrc"]
        );
    }

    #[test]
    fn test_malformed_numbers_are_absent() {
        let root = response(vec![item("a.lrc")
            .with_attribute("ratecount", "abc")
            .with_attribute("downloads", "-1")
            .with_attribute("timelength", "")]);

        let response = SearchResponse::from_node(&root).unwrap();
        let item = &response.items()[0];
        assert_eq!(item.link, "a.lrc");
        assert_eq!(item.ratecount, None);
        assert_eq!(item.downloads, None);
        assert_eq!(item.timelength, None);
    }

    #[test]
    fn test_not_found_is_not_an_error() {
        let root = GenericNode::new("return").with_attribute("result", "NOT_FOUND");
        let response = SearchResponse::from_node(&root).unwrap();

        assert_eq!(response.result, ResultCode::NotFound);
        assert!(!response.is_ok());
        assert_eq!(response.items, None);
        assert!(response.items().is_empty());
        assert_eq!(response.server_url, "");
    }

    #[test]
    fn test_unusable_children_are_skipped() {
        let root = response(vec![
            item("a.lrc"),
            GenericNode::new("fileinfo").with_attribute("artist", "no link"),
            GenericNode::new("advert").with_attribute("link", "b.lrc"),
            item("c.lrc"),
        ]);
        let response = SearchResponse::from_node(&root).unwrap();
        let links: Vec<_> = response.items().iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["a.lrc", "c.lrc"]);
    }

    #[test]
    fn test_unexpected_root() {
        let root = GenericNode::new("error");
        assert_matches!(
            SearchResponse::from_node(&root),
            Err(Error::UnexpectedRootType(t)) if t == "error"
        );
    }

    #[test]
    fn test_json_field_names() {
        let root = response(vec![item("a.lrc").with_attribute("ratecount", "2")]);
        let response = SearchResponse::from_node(&root).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["_type"], "return");
        assert_eq!(json["result"], "OK");
        assert_eq!(json["server_url"], "http://search.crintsoft.com/");
        assert_eq!(json["children"][0]["_type"], "fileinfo");
        assert_eq!(json["children"][0]["link"], "a.lrc");
        assert_eq!(json["children"][0]["ratecount"], 2);
        assert!(json["children"][0].get("artist").is_none());
    }

    #[test]
    fn test_json_without_child_block() {
        let root = GenericNode::new("return").with_attribute("result", "NOT_FOUND");
        let response = SearchResponse::from_node(&root).unwrap();

        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"_type":"return","result":"NOT_FOUND","server_url":""}"#
        );
    }

    #[test]
    fn test_json_with_empty_child_block() {
        let root = response(vec![GenericNode::new("advert")]);
        let response = SearchResponse::from_node(&root).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["children"], serde_json::json!([]));
    }
}
