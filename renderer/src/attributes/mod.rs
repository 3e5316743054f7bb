//! Typed field lookup over a decoded model
//!
//! Condition expressions never touch the decoder directly. They go through
//! [`AttributeSource`], which exposes the fixed header root, the active block
//! instances and the document version. [`MemoryModel`] is a plain in-memory
//! implementation used by the tests and the validation tool.

mod memory;

pub use memory::{FieldNode, MemoryBlock, MemoryModel};

use serde::{Deserialize, Serialize};

/// Identifies one block instance inside the decoded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// A typed field value as exposed by the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    String(String),
    Count(u64),
    Float(f32),
    FileVersion(u32),
    /// Flag word of a packed vertex descriptor
    VertexFlags(u32),
    /// Present but of a kind conditions cannot compare
    Other,
}

impl FieldValue {
    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as an unsigned count
    pub fn as_count(&self) -> Option<u64> {
        match self {
            FieldValue::Count(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f32
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Short type name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Count(_) => "count",
            FieldValue::Float(_) => "float",
            FieldValue::FileVersion(_) => "fileversion",
            FieldValue::VertexFlags(_) => "vertexflags",
            FieldValue::Other => "other",
        }
    }
}

/// What a condition path resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The path named a block but no field inside it
    Block(BlockId),
    Field(FieldValue),
}

/// Read-only capability over the decoded model
pub trait AttributeSource {
    /// Numeric format version of the open document, `0` when unknown
    fn bs_version(&self) -> u32;

    /// Look up a header field, optionally inside a named header group
    fn header_field(&self, group: Option<&str>, field: &str) -> Option<FieldValue>;

    /// Whether the block is of `type_name` or derives from it
    fn block_inherits(&self, block: BlockId, type_name: &str) -> bool;

    /// Look up a field of a block instance
    fn block_field(&self, block: BlockId, field: &str) -> Option<FieldValue>;

    /// Resolve a condition path against the header or the active blocks
    ///
    /// `HEADER/<field>` and `HEADER/<group>/<field>` address the header.
    /// Anything else is `<BlockType>[/<field>]`, matched against `blocks` in
    /// order; the first block inheriting the type decides the outcome.
    fn resolve(&self, blocks: &[BlockId], path: &str) -> Option<Resolved> {
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        if head == "HEADER" {
            let rest = rest?;
            let value = match rest.split_once('/') {
                Some((group, field)) => self.header_field(Some(group), field),
                None => self.header_field(None, rest),
            };
            return value.map(Resolved::Field);
        }

        let block = blocks
            .iter()
            .copied()
            .find(|block| self.block_inherits(*block, head))?;

        match rest {
            None | Some("") => Some(Resolved::Block(block)),
            Some(field) => self.block_field(block, field).map(Resolved::Field),
        }
    }
}

/// Parse an unsigned integer literal with C-style base detection
///
/// `0x` selects hex, a leading `0` selects octal. Unparsable text yields 0,
/// matching how literals in definition files have always been read.
pub fn parse_unsigned(text: &str) -> u64 {
    let text = text.trim();
    let parsed = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        u64::from_str_radix(&text[1..], 8)
    } else {
        text.parse::<u64>()
    };
    parsed.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unsigned_bases() {
        assert_eq!(parse_unsigned("42"), 42);
        assert_eq!(parse_unsigned("0x2A"), 42);
        assert_eq!(parse_unsigned("052"), 42);
        assert_eq!(parse_unsigned("0"), 0);
        assert_eq!(parse_unsigned(" 7 "), 7);
    }

    #[test]
    fn test_parse_unsigned_garbage_is_zero() {
        assert_eq!(parse_unsigned("abc"), 0);
        assert_eq!(parse_unsigned("0xZZ"), 0);
        assert_eq!(parse_unsigned(""), 0);
    }

    #[test]
    fn test_field_value_accessors() {
        assert_eq!(FieldValue::Count(3).as_count(), Some(3));
        assert_eq!(FieldValue::Float(1.5).as_f32(), Some(1.5));
        assert_eq!(FieldValue::String("a".into()).as_str(), Some("a"));
        assert_eq!(FieldValue::Other.as_count(), None);
        assert_eq!(FieldValue::VertexFlags(1).kind(), "vertexflags");
    }
}
