//! Named Binary Tag container format for QAM model files
//!
//! **This is a pure codec** - it handles only the self-describing tag tree
//! (value model, encoder, decoder, pretty-printer, file framing). Transport
//! concerns (gzip wrapping, file paths) are handled by the caller.
//!
//! # Wire Format
//!
//! ```text
//! File:
//!   0x00: 0x0A (root compound discriminator)
//!   0x01: root name (u16 byte length + UTF-8 bytes, ignored on read)
//!   ....: root compound payload
//!
//! Compound payload (repeats until a single 0x00 byte):
//!   type byte + name (u16 length + UTF-8) + value payload
//!
//! List payload:
//!   element type byte + i32 count + that many unnamed value payloads
//!
//! Array payloads (Byte/Short/UShort/Int/Long/Float):
//!   i32 count + fixed-width elements, no per-element framing
//!
//! String payload:
//!   u16 byte length + UTF-8 bytes (65535 bytes max)
//! ```
//!
//! Byte order is selectable per stream and defaults to big-endian.
//!
//! Unsigned short arrays are a payload reinterpretation of the signed short
//! array, not a distinct wire type: both carry discriminator 0x0D and a
//! decoded 0x0D always comes back as [`Tag::ShortArray`].
//!
//! # Usage
//!
//! ```
//! use qam_nbt::{ByteOrder, Tag, TagCompound, decode_file, encode_file};
//!
//! let mut root = TagCompound::new();
//! root.insert("id", Tag::String("mesh0".into()));
//! root.insert("count", Tag::Int(3));
//!
//! let bytes = encode_file(&root, ByteOrder::Big).unwrap();
//! let back = decode_file(&bytes, ByteOrder::Big).unwrap();
//! assert_eq!(root, back);
//! ```

mod decode;
mod encode;
mod error;
mod tag;

pub use decode::{decode_file, decode_payload};
pub use encode::{encode_file, encode_payload};
pub use error::FormatError;
pub use tag::{Tag, TagCompound, TagList, TagType};

/// Byte order of an encoded tag stream, fixed for the whole stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Network order, the conventional QAM file encoding.
    #[default]
    Big,
    Little,
}

/// Pretty-printer arrays up to this length are enumerated element by
/// element; longer ones are summarized as `<Type> [ K elements ]`.
/// Output-compatibility contract, do not change.
pub const PRETTY_ARRAY_LIMIT: usize = 11;
