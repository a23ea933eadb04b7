use std::error::Error as StdError;
use std::fmt;

use crate::h5type::TypeClass;
use crate::string::StringError;

/// Errors raised while building a descriptor tree by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeError {
    /// Compound or enum without members.
    Empty(TypeClass),
    Overlap { first: String, second: String },
    DuplicateName(String),
    DuplicateValue(String),
    /// Member does not fit into the declared compound size.
    OutOfBounds { name: String, size: usize },
    InvalidRank(usize),
    ZeroDimension,
    ValueSize { expected: usize, actual: usize },
    NotInteger(TypeClass),
    ValueOutOfRange(i64),
    InvalidFloat(&'static str),
    TooLarge,
    String(StringError),
}

impl From<StringError> for TypeError {
    fn from(err: StringError) -> Self {
        TypeError::String(err)
    }
}

impl StdError for TypeError {}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeError::Empty(class) => write!(f, "{} type must have at least one member", class),
            TypeError::Overlap { first, second } => {
                write!(f, "member \"{}\" overlaps with member \"{}\"", second, first)
            }
            TypeError::DuplicateName(name) => write!(f, "duplicate member name: \"{}\"", name),
            TypeError::DuplicateValue(name) => {
                write!(f, "value of member \"{}\" is already in use", name)
            }
            TypeError::OutOfBounds { name, size } => {
                write!(f, "member \"{}\" extends beyond the type size of {} bytes", name, size)
            }
            TypeError::InvalidRank(rank) => write!(f, "invalid array rank: {}", rank),
            TypeError::ZeroDimension => write!(f, "zero-sized array dimension"),
            TypeError::ValueSize { expected, actual } => {
                write!(f, "enum value has {} bytes, expected {}", actual, expected)
            }
            TypeError::NotInteger(class) => write!(f, "enum base must be an integer, got {}", class),
            TypeError::ValueOutOfRange(value) => {
                write!(f, "value {} does not fit into the enum base type", value)
            }
            TypeError::InvalidFloat(msg) => write!(f, "invalid floating-point layout: {}", msg),
            TypeError::TooLarge => write!(f, "type size overflows"),
            TypeError::String(err) => err.fmt(f),
        }
    }
}
