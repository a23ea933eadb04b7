use std::error::Error as StdError;
use std::fmt;

use ascii::{AsAsciiStr, AsAsciiStrError, AsciiString};

/// Tag lengths are stored in the low byte of the opaque class flags.
pub const OPAQUE_TAG_MAX: usize = 256;

/// Longest tag whose NUL-padded form still fits into the flags byte.
pub const OPAQUE_TAG_LEN_MAX: usize = OPAQUE_TAG_MAX - 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StringError {
    InternalNull,
    TooLong { len: usize, max: usize },
    AsciiError(AsAsciiStrError),
}

impl From<AsAsciiStrError> for StringError {
    fn from(err: AsAsciiStrError) -> Self {
        StringError::AsciiError(err)
    }
}

impl StdError for StringError {}

impl fmt::Display for StringError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StringError::InternalNull => write!(f, "string error: string with internal null"),
            StringError::TooLong { len, max } => {
                write!(f, "string error: length {} exceeds maximum of {}", len, max)
            }
            StringError::AsciiError(err) => write!(f, "string error: {}", err),
        }
    }
}

/// Member names are stored NUL-terminated, so they cannot contain NUL themselves.
pub fn validate_name(name: &str) -> Result<(), StringError> {
    if name.bytes().any(|c| c == 0) {
        Err(StringError::InternalNull)
    } else {
        Ok(())
    }
}

/// Converts an opaque tag into its stored form.
pub fn ascii_tag(tag: &str) -> Result<AsciiString, StringError> {
    validate_name(tag)?;
    if tag.len() > OPAQUE_TAG_LEN_MAX {
        return Err(StringError::TooLong { len: tag.len(), max: OPAQUE_TAG_LEN_MAX });
    }
    Ok(tag.as_ascii_str()?.to_owned())
}
