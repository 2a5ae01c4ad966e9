use super::model::*;
use super::string_table::REFERENCE_OFFSET;
use err_derive::Error;
use log::*;
use nom::{
    bytes::complete::{tag, take},
    combinator::peek,
    error::{ErrorKind, ParseError},
    number::complete::{le_u32, le_u8},
};

type IResult<I, O, E = Error> = Result<(I, O), nom::Err<E>>;

/// The error types used during deserialisation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The stream does not start with `MBXML1`
    #[error(display = "MBXML header mismatch")]
    HeaderMismatch,
    /// The format version is not the supported one
    #[error(display = "Header version mismatch: got {}", _0)]
    VersionMismatch(u32),
    /// The string table does not start with `ST` or declares an impossible size
    #[error(display = "String table header mismatch")]
    StringTableHeaderMismatch,
    /// A reference byte is a control tag or points past the string table
    #[error(
        display = "Reference {:#04x} is outside the {} entry string table",
        reference,
        table_len
    )]
    ReferenceOutOfBounds {
        /// The offending byte
        reference: u8,
        /// Number of strings in the table
        table_len: usize,
    },
    /// An element does not start with the open tag
    #[error(display = "Expected open tag, got {:#04x}", _0)]
    ExpectedOpenTag(u8),
    /// An element does not end with the close tag
    #[error(display = "Expected close tag, got {:#04x}", _0)]
    ExpectedCloseTag(u8),
    /// The stream ended in the middle of a field or element
    #[error(display = "Unexpected end of buffer")]
    UnexpectedEndOfBuffer,
    /// Elements are nested deeper than [`DecodeOptions::max_depth`]
    #[error(display = "Elements nested deeper than {}", _0)]
    DepthExceeded(usize),
    /// A declared length or count disagrees with the content, strict mode only
    #[error(
        display = "Declared {} of {} does not match the actual {}",
        field,
        declared,
        actual
    )]
    LengthMismatch {
        /// Which header field disagrees
        field: &'static str,
        /// The value in the header
        declared: u64,
        /// The value found in the content
        actual: u64,
    },
    /// A Nom parsing error not covered by the above
    #[error(display = "Parsing error: {}", _0)]
    NomError(String),
}

impl<'a> ParseError<&'a [u8]> for Error {
    fn from_error_kind(_input: &'a [u8], kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Eof => Error::UnexpectedEndOfBuffer,
            kind => Error::NomError(format!("{:?}", kind)),
        }
    }

    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(k: nom::Err<Error>) -> Self {
        match k {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(_) => Error::UnexpectedEndOfBuffer,
        }
    }
}

impl Document {
    /// Decode a decrypted response body
    pub fn deserialize(buf: &[u8], options: &DecodeOptions) -> Result<Document, Error> {
        // Throw away the nom-specific return types
        let (rest, document) = mbxml_document(options, buf)?;
        if !rest.is_empty() {
            debug!("Ignoring {} bytes after the root element", rest.len());
        }
        Ok(document)
    }
}

impl GenericNode {
    /// Decode a decrypted response body and keep only the tree
    pub fn deserialize(buf: &[u8], options: &DecodeOptions) -> Result<GenericNode, Error> {
        Ok(Document::deserialize(buf, options)?.root)
    }
}

fn fail<I, O>(e: Error) -> IResult<I, O> {
    Err(nom::Err::Failure(e))
}

fn literal<'a>(
    expected: &'static [u8],
    err: Error,
) -> impl Fn(&'a [u8]) -> IResult<&'a [u8], &'a [u8]> {
    move |buf| tag::<_, _, Error>(expected)(buf).map_err(|_| nom::Err::Failure(err.clone()))
}

fn check_length(
    options: &DecodeOptions,
    field: &'static str,
    declared: u64,
    actual: u64,
) -> Result<(), nom::Err<Error>> {
    if declared == actual {
        return Ok(());
    }
    if options.strict_lengths {
        return Err(nom::Err::Failure(Error::LengthMismatch {
            field,
            declared,
            actual,
        }));
    }
    warn!(
        "Declared {} is {} but the content has {}",
        field, declared, actual
    );
    Ok(())
}

fn mbxml_document<'a>(options: &DecodeOptions, buf: &'a [u8]) -> IResult<&'a [u8], Document> {
    let stream_len = buf.len() as u64;
    let (buf, header) = mbxml_header(buf)?;
    check_length(options, "total length", header.total_len as u64, stream_len)?;

    let (buf, strings) = mbxml_string_table(options, buf)?;
    let (buf, node_count) = le_u32(buf)?;
    trace!("Declared node count {}", node_count);

    let (buf, root) = mbxml_element(options, &strings, 1, buf)?;
    check_length(
        options,
        "node count",
        node_count as u64,
        root.count() as u64,
    )?;

    Ok((
        buf,
        Document {
            header,
            strings,
            node_count,
            root,
        },
    ))
}

fn mbxml_header(buf: &[u8]) -> IResult<&[u8], WireHeader> {
    let (buf, _magic) = literal(MAGIC_HEADER, Error::HeaderMismatch)(buf)?;
    let (buf, version) = le_u32(buf)?;
    if version != MBXML_VERSION {
        return fail(Error::VersionMismatch(version));
    }
    // Counted from the start of the magic
    let (buf, total_len) = le_u32(buf)?;
    trace!("MBXML version {} declaring {} bytes", version, total_len);

    Ok((buf, WireHeader { version, total_len }))
}

fn mbxml_string_table<'a>(
    options: &DecodeOptions,
    buf: &'a [u8],
) -> IResult<&'a [u8], StringTable> {
    let (buf, _magic) = literal(MAGIC_STRING_TABLE, Error::StringTableHeaderMismatch)(buf)?;
    let (buf, size) = le_u32(buf)?;
    let block_len = match size.checked_sub(STRING_TABLE_HEADER_LEN) {
        Some(len) => len,
        None => return fail(Error::StringTableHeaderMismatch),
    };
    let (buf, declared_count) = le_u32(buf)?;
    let (buf, block) = take(block_len as usize)(buf)?;

    let strings = StringTable::from_block(block);
    check_length(
        options,
        "string count",
        declared_count as u64,
        strings.len() as u64,
    )?;
    debug!(
        "String table of {} bytes with {} strings",
        block_len,
        strings.len()
    );

    Ok((buf, strings))
}

fn mbxml_reference<'a, 't>(
    strings: &'t StringTable,
    buf: &'a [u8],
) -> IResult<&'a [u8], &'t str> {
    let (buf, reference) = le_u8(buf)?;
    match strings.resolve(reference) {
        Some(s) => Ok((buf, s)),
        None => fail(Error::ReferenceOutOfBounds {
            reference,
            table_len: strings.len(),
        }),
    }
}

fn mbxml_element<'a>(
    options: &DecodeOptions,
    strings: &StringTable,
    depth: usize,
    buf: &'a [u8],
) -> IResult<&'a [u8], GenericNode> {
    if depth > options.max_depth {
        return fail(Error::DepthExceeded(options.max_depth));
    }

    let (buf, open) = le_u8(buf)?;
    if open != TAG_OPEN {
        return fail(Error::ExpectedOpenTag(open));
    }
    let (mut buf, node_type) = mbxml_reference(strings, buf)?;
    let mut node = GenericNode::new(node_type);

    // Attributes run until the first control tag
    loop {
        let (_, next) = peek(le_u8)(buf)?;
        if next < REFERENCE_OFFSET {
            break;
        }
        let (rest, key) = mbxml_reference(strings, buf)?;
        let (rest, value) = mbxml_reference(strings, rest)?;
        if node.attributes.insert(key, value).is_some() {
            debug!("Duplicate attribute {} on {}", key, node.node_type);
        }
        buf = rest;
    }

    let (_, next) = peek(le_u8)(buf)?;
    if next == TAG_CHILDREN {
        let (mut rest, _) = le_u8(buf)?;
        let mut children = vec![];
        loop {
            let (_, next) = peek(le_u8)(rest)?;
            if next == TAG_CLOSE {
                break;
            }
            let (after_child, child) = mbxml_element(options, strings, depth + 1, rest)?;
            children.push(child);
            rest = after_child;
        }
        node.children = Some(children);
        buf = rest;
    }

    let (buf, close) = le_u8(buf)?;
    if close != TAG_CLOSE {
        return fail(Error::ExpectedCloseTag(close));
    }

    Ok((buf, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbxml::string_table::MAX_STRINGS;
    use assert_matches::assert_matches;

    fn init() {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .is_test(true)
            .try_init();
    }

    /// Build a stream by hand so the tests do not depend on the writer
    fn stream(strings: &[&str], node_count: u32, elements: &[u8]) -> Vec<u8> {
        let mut block = vec![];
        for s in strings {
            block.extend_from_slice(s.as_bytes());
            block.push(0);
        }

        let mut buf = vec![];
        buf.extend_from_slice(b"MBXML1");
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0; 4]);
        buf.extend_from_slice(b"ST");
        buf.extend_from_slice(&(block.len() as u32 + 8).to_le_bytes());
        buf.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        buf.extend_from_slice(&block);
        buf.extend_from_slice(&node_count.to_le_bytes());
        buf.extend_from_slice(elements);

        let total_len = buf.len() as u32;
        buf[10..14].copy_from_slice(&total_len.to_le_bytes());
        buf
    }

    fn decode(buf: &[u8]) -> Result<GenericNode, Error> {
        GenericNode::deserialize(buf, &DecodeOptions::default())
    }

    #[test]
    fn test_minimal_document() {
        init();
        let buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        let node = decode(&buf).unwrap();

        assert_eq!(node, GenericNode::new("return"));
        assert!(node.attributes.is_empty());
        assert_eq!(node.children, None);
    }

    #[test]
    fn test_document_fields() {
        init();
        let buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        let document = Document::deserialize(&buf, &DecodeOptions::default()).unwrap();

        assert_eq!(document.header.version, 2);
        assert_eq!(document.header.total_len as usize, buf.len());
        assert_eq!(document.node_count, 1);
        assert_eq!(document.strings.iter().collect::<Vec<_>>(), vec!["return"]);
    }

    #[test]
    fn test_attributes_and_children() {
        init();
        let buf = stream(
            &[
                "return",
                "result",
                "OK",
                "fileinfo",
                "link",
                "/a.lrc",
                "/b.lrc",
            ],
            3,
            &[
                0x02, 10, 11, 12, // <return result="OK"
                0x03, // >
                0x02, 13, 14, 15, 0x04, // <fileinfo link="/a.lrc"/>
                0x02, 13, 14, 16, 0x03, 0x04, // <fileinfo link="/b.lrc"></fileinfo>
                0x04, // </return>
            ],
        );
        let node = decode(&buf).unwrap();

        assert_eq!(node.node_type, "return");
        assert_eq!(node.attribute("result"), Some("OK"));
        let children = node.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].attribute("link"), Some("/a.lrc"));
        assert_eq!(children[0].children, None);
        assert_eq!(children[1].attribute("link"), Some("/b.lrc"));
        assert_eq!(children[1].children, Some(vec![]));
    }

    #[test]
    fn test_header_mismatch() {
        let mut buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        buf[0] = b'N';
        assert_matches!(decode(&buf), Err(Error::HeaderMismatch));
        assert_matches!(decode(b"MBX"), Err(Error::HeaderMismatch));
    }

    #[test]
    fn test_version_mismatch() {
        let mut buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        buf[6] = 3;
        assert_matches!(decode(&buf), Err(Error::VersionMismatch(3)));
    }

    #[test]
    fn test_string_table_header_mismatch() {
        let mut buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        buf[14] = b'S';
        buf[15] = b'X';
        assert_matches!(decode(&buf), Err(Error::StringTableHeaderMismatch));

        let mut buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        buf[16..20].copy_from_slice(&4u32.to_le_bytes());
        assert_matches!(decode(&buf), Err(Error::StringTableHeaderMismatch));
    }

    #[test]
    fn test_string_count_mismatch_is_lenient() {
        init();
        let mut buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        buf[20..24].copy_from_slice(&7u32.to_le_bytes());
        assert_eq!(decode(&buf).unwrap(), GenericNode::new("return"));
    }

    #[test]
    fn test_declared_lengths_are_informational() {
        init();
        let mut buf = stream(&["return"], 9, &[0x02, 10, 0x04]);
        buf[10..14].copy_from_slice(&1234u32.to_le_bytes());
        assert_eq!(decode(&buf).unwrap(), GenericNode::new("return"));
    }

    #[test]
    fn test_strict_lengths() {
        let options = DecodeOptions {
            strict_lengths: true,
            ..Default::default()
        };

        let buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        assert!(GenericNode::deserialize(&buf, &options).is_ok());

        let buf = stream(&["return"], 2, &[0x02, 10, 0x04]);
        assert_matches!(
            GenericNode::deserialize(&buf, &options),
            Err(Error::LengthMismatch {
                field: "node count",
                declared: 2,
                actual: 1
            })
        );

        let mut buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        buf[20..24].copy_from_slice(&3u32.to_le_bytes());
        assert_matches!(
            GenericNode::deserialize(&buf, &options),
            Err(Error::LengthMismatch {
                field: "string count",
                ..
            })
        );

        let mut buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        buf.push(0);
        assert_matches!(
            GenericNode::deserialize(&buf, &options),
            Err(Error::LengthMismatch {
                field: "total length",
                ..
            })
        );
    }

    #[test]
    fn test_type_reference_below_offset() {
        let buf = stream(&["return"], 1, &[0x02, 5, 0x04]);
        assert_matches!(
            decode(&buf),
            Err(Error::ReferenceOutOfBounds {
                reference: 5,
                table_len: 1
            })
        );
    }

    #[test]
    fn test_reference_past_table() {
        let buf = stream(&["return"], 1, &[0x02, 11, 0x04]);
        assert_matches!(
            decode(&buf),
            Err(Error::ReferenceOutOfBounds { reference: 11, .. })
        );

        // Attribute value pointing past the table
        let buf = stream(&["return", "k"], 1, &[0x02, 10, 11, 200, 0x04]);
        assert_matches!(
            decode(&buf),
            Err(Error::ReferenceOutOfBounds { reference: 200, .. })
        );

        // Attribute key without a value
        let buf = stream(&["return", "k"], 1, &[0x02, 10, 11, 0x04]);
        assert_matches!(
            decode(&buf),
            Err(Error::ReferenceOutOfBounds { reference: 4, .. })
        );
    }

    #[test]
    fn test_unterminated_string_is_not_addressable() {
        init();
        // Table block "return\0bc" with no NUL after the last string
        let mut buf = stream(&["return", "bc"], 1, &[0x02, 11, 0x04]);
        let nul = 24 + "return\0bc".len();
        assert_eq!(buf.remove(nul), 0);
        buf[16..20].copy_from_slice(&(8 + "return\0bc".len() as u32).to_le_bytes());

        assert_matches!(
            decode(&buf),
            Err(Error::ReferenceOutOfBounds {
                reference: 11,
                table_len: 1
            })
        );
    }

    #[test]
    fn test_missing_close_tag() {
        let buf = stream(&["return"], 1, &[0x02, 10, 0x02]);
        assert_matches!(decode(&buf), Err(Error::ExpectedCloseTag(0x02)));

        let buf = stream(&["return"], 1, &[0x02, 10]);
        assert_matches!(decode(&buf), Err(Error::UnexpectedEndOfBuffer));
    }

    #[test]
    fn test_child_block_without_close() {
        let buf = stream(&["return"], 2, &[0x02, 10, 0x03, 0x02, 10, 0x04]);
        assert_matches!(decode(&buf), Err(Error::UnexpectedEndOfBuffer));
    }

    #[test]
    fn test_child_without_open_tag() {
        let buf = stream(&["return"], 2, &[0x02, 10, 0x03, 0x01, 0x04]);
        assert_matches!(decode(&buf), Err(Error::ExpectedOpenTag(0x01)));
    }

    #[test]
    fn test_truncated_headers() {
        let buf = stream(&["return"], 1, &[0x02, 10, 0x04]);
        for len in [8, 12, 17, 22, 26, 30] {
            assert_matches!(
                decode(&buf[..len]),
                Err(Error::UnexpectedEndOfBuffer),
                "length {}",
                len
            );
        }
    }

    #[test]
    fn test_depth_limit() {
        let options = DecodeOptions {
            max_depth: 3,
            ..Default::default()
        };

        // return > fileinfo > fileinfo
        let nested = [0x02, 10, 0x03, 0x02, 10, 0x03, 0x02, 10, 0x04, 0x04, 0x04];
        let buf = stream(&["return"], 3, &nested);
        assert_eq!(GenericNode::deserialize(&buf, &options).unwrap().count(), 3);

        let options = DecodeOptions {
            max_depth: 2,
            ..Default::default()
        };
        assert_matches!(
            GenericNode::deserialize(&buf, &options),
            Err(Error::DepthExceeded(2))
        );
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 100_000;
        let mut elements = vec![];
        for _ in 0..depth {
            elements.extend_from_slice(&[0x02, 10, 0x03]);
        }
        let buf = stream(&["return"], depth, &elements);
        assert_matches!(decode(&buf), Err(Error::DepthExceeded(64)));
    }

    #[test]
    fn test_full_reference_range() {
        let strings: Vec<String> = (0..MAX_STRINGS).map(|i| format!("s{}", i)).collect();
        let strings: Vec<&str> = strings.iter().map(String::as_str).collect();
        let buf = stream(&strings, 1, &[0x02, 255, 10, 254, 0x04]);
        let node = decode(&buf).unwrap();

        assert_eq!(node.node_type, format!("s{}", MAX_STRINGS - 1));
        assert_eq!(node.attribute("s0"), Some(format!("s{}", MAX_STRINGS - 2).as_str()));
    }
}
