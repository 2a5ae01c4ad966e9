//! MBXML1 is the compact binary form the search service uses for its XML
//! replies. Once the envelope is removed the stream is laid out as:
//!
//! ```text
//! "MBXML1" | version: u32 = 2 | total length: u32
//! "ST" | table size: u32 | string count: u32 | NUL terminated strings
//! node count: u32
//! root element
//! ```
//!
//! All integers are little endian. The table size counts the size and count
//! fields themselves, so the string block is eight bytes shorter.
//!
//! # Elements
//!
//! ```text
//! Element   := 0x02 TypeRef (KeyRef ValueRef)* [0x03 Element*] 0x04
//! ```
//!
//! Every reference is a single byte `b >= 10` naming string `b - 10`. Bytes
//! below 10 are control tags, which is how the attribute list ends without a
//! count. The child block is optional and runs until the parent's 0x04.
//!
//! The total length and node count are informational unless
//! [`DecodeOptions::strict_lengths`] is set.

/// Contains the tree and header structures
pub mod model;
/// Contains the interned string pool
pub mod string_table;

/// Contains code related to the deserialisation of MBXML1 streams
pub mod de;
/// Contains code related to the serialisation of MBXML1 streams
pub mod ser;

pub use model::{Attributes, DecodeOptions, Document, GenericNode, WireHeader, MBXML_VERSION};
pub use string_table::StringTable;
