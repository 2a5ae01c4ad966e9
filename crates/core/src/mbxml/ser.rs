use super::model::*;
use super::string_table::{MAX_STRINGS, REFERENCE_OFFSET};
use cookie_factory::bytes::*;
use cookie_factory::sequence::tuple;
use cookie_factory::{combinator::*, gen};
use cookie_factory::{GenError, GenResult, WriteContext};
use err_derive::Error;
use std::collections::HashMap;
use std::io::Write;

/// The error types used during serialisation
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// A Cookie Factor GenError
    #[error(display = "Cookie GenError")]
    GenError(#[error(source)] std::sync::Arc<GenError>),
    /// More distinct strings than a one byte reference can address
    #[error(display = "Tree uses {} distinct strings, at most 246 fit", _0)]
    TooManyStrings(usize),
}

impl From<GenError> for Error {
    fn from(k: GenError) -> Self {
        Error::GenError(std::sync::Arc::new(k))
    }
}

/// Assigns every distinct string a reference in first use order
#[derive(Default)]
struct Interner<'a> {
    strings: Vec<&'a str>,
    references: HashMap<&'a str, u8>,
}

impl<'a> Interner<'a> {
    fn from_tree(root: &'a GenericNode) -> Result<Self, Error> {
        let mut interner = Interner::default();
        interner.visit(root);
        if interner.strings.len() > MAX_STRINGS {
            return Err(Error::TooManyStrings(interner.strings.len()));
        }
        Ok(interner)
    }

    fn visit(&mut self, node: &'a GenericNode) {
        self.intern(&node.node_type);
        for (key, value) in node.attributes.iter() {
            self.intern(key);
            self.intern(value);
        }
        for child in node.children() {
            self.visit(child);
        }
    }

    fn intern(&mut self, s: &'a str) {
        if !self.references.contains_key(s) {
            // Saturates past the limit, which from_tree rejects anyway
            let reference = (self.strings.len() + REFERENCE_OFFSET as usize).min(255) as u8;
            self.references.insert(s, reference);
            self.strings.push(s);
        }
    }

    fn reference(&self, s: &str) -> Result<u8, GenError> {
        self.references
            .get(s)
            .copied()
            .ok_or(GenError::CustomError(0))
    }

    fn table(&self) -> StringTable {
        StringTable::from(
            self.strings
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        )
    }
}

impl GenericNode {
    /// Write this node as the root of a complete MBXML1 stream
    ///
    /// Strings are interned in the order they are first met walking the tree
    /// depth first.
    pub fn serialize<W: Write>(&self, buf: W) -> Result<W, Error> {
        let interner = Interner::from_tree(self)?;
        let (elements, _) = gen(
            |out: WriteContext<Vec<u8>>| mbxml_element(self, &interner, out),
            vec![],
        )?;
        let block = interner.table().to_block();

        let total_len = MAGIC_HEADER.len()
            + 4
            + 4
            + MAGIC_STRING_TABLE.len()
            + STRING_TABLE_HEADER_LEN as usize
            + block.len()
            + 4
            + elements.len();

        let (buf, _n) = gen(
            tuple((
                slice(MAGIC_HEADER),
                le_u32(MBXML_VERSION),
                le_u32(total_len as u32),
                slice(MAGIC_STRING_TABLE),
                le_u32(block.len() as u32 + STRING_TABLE_HEADER_LEN),
                le_u32(interner.strings.len() as u32),
                slice(&block),
                le_u32(self.count() as u32),
                slice(&elements),
            )),
            buf,
        )?;
        Ok(buf)
    }
}

fn mbxml_element<W: Write>(
    node: &GenericNode,
    interner: &Interner<'_>,
    out: WriteContext<W>,
) -> GenResult<W> {
    let mut out = tuple((
        be_u8(TAG_OPEN),
        be_u8(interner.reference(&node.node_type)?),
    ))(out)?;
    for (key, value) in node.attributes.iter() {
        out = tuple((
            be_u8(interner.reference(key)?),
            be_u8(interner.reference(value)?),
        ))(out)?;
    }
    if let Some(children) = &node.children {
        out = be_u8(TAG_CHILDREN)(out)?;
        for child in children {
            out = mbxml_element(child, interner, out)?;
        }
    }
    be_u8(TAG_CLOSE)(out)
}
