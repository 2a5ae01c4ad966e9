use log::*;

/// Reference bytes below this value are control tags
pub const REFERENCE_OFFSET: u8 = 10;

/// The most strings a single byte reference can address
pub const MAX_STRINGS: usize = 256 - REFERENCE_OFFSET as usize;

/// The pool of strings that every element type, attribute key and attribute
/// value in the tree points into
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    /// Split a block of NUL terminated strings
    ///
    /// The fragment after the final NUL is dropped. Bytes that are not
    /// valid UTF-8 are replaced rather than failing the whole response.
    pub fn from_block(block: &[u8]) -> Self {
        let mut fragments: Vec<&[u8]> = block.split(|b| *b == 0).collect();
        // The final fragment is never a string, even when no NUL closes it
        if let Some(last) = fragments.pop() {
            if !last.is_empty() {
                warn!(
                    "String table does not end with a NUL, dropping the last {} bytes",
                    last.len()
                );
            }
        }

        let strings = fragments
            .into_iter()
            .map(|fragment| match std::str::from_utf8(fragment) {
                Ok(s) => s.to_string(),
                Err(e) => {
                    warn!("Invalid UTF-8 in string table: {}", e);
                    String::from_utf8_lossy(fragment).into_owned()
                }
            })
            .collect();

        Self { strings }
    }

    /// The block form of the table, every string followed by a NUL
    pub fn to_block(&self) -> Vec<u8> {
        let mut block = Vec::with_capacity(self.strings.iter().map(|s| s.len() + 1).sum());
        for s in &self.strings {
            block.extend_from_slice(s.as_bytes());
            block.push(0);
        }
        block
    }

    /// The string at a zero based index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Look up the string a reference byte from the tree points to
    pub fn resolve(&self, reference: u8) -> Option<&str> {
        reference
            .checked_sub(REFERENCE_OFFSET)
            .and_then(|index| self.get(index as usize))
    }

    /// Number of strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True when there is nothing in it
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Strings in table order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for StringTable {
    fn from(strings: Vec<String>) -> Self {
        Self { strings }
    }
}
