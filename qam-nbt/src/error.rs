//! Codec error type

use crate::TagType;

/// Error raised by the tag codec.
///
/// Format errors are fatal: a malformed stream is never silently recovered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The stream ended before the current value was complete.
    #[error("unexpected end of tag stream")]
    UnexpectedEof,

    /// A file did not begin with the compound discriminator (0x0A).
    #[error("file does not begin with a compound tag (found 0x{0:02X})")]
    BadRoot(u8),

    /// A type byte does not name any tag type.
    #[error("unknown tag type 0x{0:02X}")]
    UnknownTagType(u8),

    /// An End tag appeared where a value was expected.
    #[error("End tag is only valid as a compound terminator")]
    UnexpectedEnd,

    /// A list contained an element of a kind other than its declared one.
    #[error("heterogeneous list: declared {expected:?}, found {found:?}")]
    HeterogeneousList { expected: TagType, found: TagType },

    /// A string exceeded the u16 length prefix.
    #[error("string of {0} bytes exceeds the 65535-byte limit")]
    StringTooLong(usize),

    /// String bytes were not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// A list or array carried a negative length.
    #[error("negative length {0}")]
    NegativeLength(i32),
}
