pub use super::string_table::StringTable;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::iter::FromIterator;

pub(super) const MAGIC_HEADER: &[u8] = b"MBXML1";
pub(super) const MAGIC_STRING_TABLE: &[u8] = b"ST";

/// The only version of the format that is understood
pub const MBXML_VERSION: u32 = 2;

/// The string table size field counts itself and the count field
pub(super) const STRING_TABLE_HEADER_LEN: u32 = 8;

pub(super) const TAG_OPEN: u8 = 0x02;
pub(super) const TAG_CHILDREN: u8 = 0x03;
pub(super) const TAG_CLOSE: u8 = 0x04;

/// The fixed part at the start of every decrypted response
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct WireHeader {
    /// Format version, always [`MBXML_VERSION`]
    pub version: u32,
    /// Declared length of the whole stream counted from the magic
    pub total_len: u32,
}

/// A fully decoded MBXML1 stream
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Document {
    /// The fixed header fields
    pub header: WireHeader,
    /// Every string the tree refers to
    pub strings: StringTable,
    /// Declared number of elements in the tree
    pub node_count: u32,
    /// The single root element
    pub root: GenericNode,
}

/// Limits applied while decoding
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DecodeOptions {
    /// Deepest element nesting accepted, the root is at depth one
    pub max_depth: usize,
    /// Fail when the declared lengths and counts disagree with the content
    /// instead of only logging it
    pub strict_lengths: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            strict_lengths: false,
        }
    }
}

/// An untyped element of the tree
///
/// Serialises the same way the service's documents are usually rendered as
/// JSON: the type under `_type`, the attributes inline and the children under
/// `children`.
#[derive(Debug, PartialEq, Eq, Clone, Default, serde::Serialize)]
pub struct GenericNode {
    /// The element name
    #[serde(rename = "_type")]
    pub node_type: String,
    /// Attributes in wire order
    #[serde(flatten)]
    pub attributes: Attributes,
    /// `None` for leaves, which carry no child block at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<GenericNode>>,
}

impl GenericNode {
    /// A leaf element without attributes
    pub fn new<T: Into<String>>(node_type: T) -> Self {
        Self {
            node_type: node_type.into(),
            ..Default::default()
        }
    }

    /// Builder form of [`Attributes::insert`]
    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Give the element a child block
    pub fn with_children(mut self, children: Vec<GenericNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Value of an attribute, if present
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    /// The children, empty for leaves
    pub fn children(&self) -> &[GenericNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of elements in this subtree including itself
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(GenericNode::count).sum::<usize>()
    }
}

/// Attributes of an element in the order they appeared on the wire
///
/// Setting a key again replaces the value but keeps its first position.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// An empty set
    pub fn new() -> Self {
        Default::default()
    }

    /// Set a value, returning the one it replaced
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    /// Looks up the value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there is nothing in it
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key and value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[test]
fn test_attribute_order_and_replace() {
    let mut attributes = Attributes::new();
    assert_eq!(attributes.insert("b", "1"), None);
    assert_eq!(attributes.insert("a", "2"), None);
    assert_eq!(attributes.insert("b", "3"), Some("1".to_string()));

    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes.get("b"), Some("3"));
    assert_eq!(attributes.get("c"), None);
    assert_eq!(
        attributes.iter().collect::<Vec<_>>(),
        vec![("b", "3"), ("a", "2")]
    );
}

#[test]
fn test_node_count() {
    let leaf = GenericNode::new("fileinfo");
    assert_eq!(leaf.count(), 1);
    assert!(leaf.children().is_empty());

    let root = GenericNode::new("return").with_children(vec![
        leaf.clone(),
        GenericNode::new("fileinfo").with_children(vec![leaf]),
        GenericNode::new("fileinfo").with_children(vec![]),
    ]);
    assert_eq!(root.count(), 5);
}
