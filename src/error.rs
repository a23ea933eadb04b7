use std::error::Error as StdError;
use std::fmt;

use hdf5_dtype_types::{TypeClass, TypeError, Version};

/// The error type for datatype message encoding and decoding.
#[derive(Clone, PartialEq, Eq)]
pub enum Error {
    /// Unknown type class code in a message header.
    UnsupportedClass(u8),
    /// Version outside the range valid for the message or for its class.
    BadVersion { class: Option<TypeClass>, version: u8 },
    /// Nested content needs a newer version but the decode was strict.
    IncompatibleVersion { class: TypeClass, stored: Version, required: Version },
    /// Compound or enum declaring zero members.
    InvalidMemberCount(TypeClass),
    OverlappingMembers { first: String, second: String },
    MalformedFloatEncoding(&'static str),
    OutOfMemory,
    /// The buffer ended before a field could be read or written.
    BufferTooShort { needed: usize, available: usize },
    /// Types nested deeper than the configured limit.
    RecursionLimitExceeded(usize),
    /// Structurally invalid message content.
    Malformed(String),
    /// Invalid descriptor built by the caller.
    Type(TypeError),
    /// A descriptor value that cannot be represented in a message.
    Internal(String),
}

/// A type for results generated by the codec where the `Err` type is set to
/// `hdf5_dtype::Error`.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

impl From<&str> for Error {
    fn from(desc: &str) -> Self {
        Self::Internal(desc.into())
    }
}

impl From<String> for Error {
    fn from(desc: String) -> Self {
        Self::Internal(desc)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Self::Type(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnsupportedClass(code) => write!(f, "unknown datatype class found: {}", code),
            Self::BadVersion { class: None, version } => {
                write!(f, "bad version number for datatype message: {}", version)
            }
            Self::BadVersion { class: Some(class), version } => {
                write!(f, "bad version number for {} datatype: {}", class, version)
            }
            Self::IncompatibleVersion { class, stored, required } => write!(
                f,
                "incorrect {} datatype version: stored {}, required {}",
                class, stored, required
            ),
            Self::InvalidMemberCount(class) => {
                write!(f, "invalid number of members in {} datatype: 0", class)
            }
            Self::OverlappingMembers { first, second } => {
                write!(f, "member \"{}\" overlaps with previous member \"{}\"", second, first)
            }
            Self::MalformedFloatEncoding(desc) => write!(f, "malformed floating-point type: {}", desc),
            Self::OutOfMemory => f.write_str("memory allocation failed"),
            Self::BufferTooShort { needed, available } => write!(
                f,
                "buffer too short: needed {} bytes, {} available",
                needed, available
            ),
            Self::RecursionLimitExceeded(depth) => {
                write!(f, "datatype nesting exceeds the limit of {} levels", depth)
            }
            Self::Malformed(desc) => write!(f, "malformed datatype message: {}", desc),
            Self::Type(err) => err.fmt(f),
            Self::Internal(desc) => f.write_str(desc),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Type(err) => Some(err),
            _ => None,
        }
    }
}
