use crate::error::TypeError;
use crate::h5type::{CharacterSet, Location, StringPadding, TypeDescriptor};

/// Maximum rank of an array type.
pub const MAX_RANK: usize = 32;

/// Fixed-size multi-dimensional array of a base type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayType {
    pub base: Box<TypeDescriptor>,
    pub dims: Vec<u32>,
}

impl ArrayType {
    pub fn new(base: TypeDescriptor, dims: &[u32]) -> Result<Self, TypeError> {
        if dims.is_empty() || dims.len() > MAX_RANK {
            return Err(TypeError::InvalidRank(dims.len()));
        }
        if dims.contains(&0) {
            return Err(TypeError::ZeroDimension);
        }
        Ok(Self { base: Box::new(base), dims: dims.to_vec() })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements, saturating on overflow.
    pub fn element_count(&self) -> usize {
        self.dims.iter().fold(1usize, |n, &d| n.saturating_mul(d as usize))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarLenKind {
    Sequence,
    String { pad: StringPadding, cset: CharacterSet },
}

impl VarLenKind {
    /// Kind code stored in the low nibble of the class flags.
    pub fn code(self) -> u8 {
        match self {
            VarLenKind::Sequence => 0,
            VarLenKind::String { .. } => 1,
        }
    }
}

/// Variable-length sequence or string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarLenType {
    pub kind: VarLenKind,
    pub base: Box<TypeDescriptor>,
    pub location: Location,
}

impl VarLenType {
    /// Element size of a variable-length type in memory (length plus pointer).
    pub const SIZE: usize = 16;

    pub fn new(kind: VarLenKind, base: TypeDescriptor) -> Self {
        Self { kind, base: Box::new(base), location: Location::Undefined }
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, VarLenKind::String { .. })
    }
}
