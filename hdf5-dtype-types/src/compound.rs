use crate::bits;
use crate::error::TypeError;
use crate::h5type::{ByteOrder, Pad, Sign, TypeDescriptor, TypeKind};
use crate::string::validate_name;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundMember {
    pub name: String,
    /// Byte offset of the member within the compound.
    pub offset: usize,
    pub dtype: TypeDescriptor,
}

impl CompoundMember {
    pub fn new(name: &str, offset: usize, dtype: TypeDescriptor) -> Self {
        Self { name: name.to_owned(), offset, dtype }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.dtype.size
    }

    /// One past the last byte occupied by the member.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.dtype.size)
    }

    /// Empty members occupy no bytes and never overlap anything.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.size() > 0 && other.size() > 0 && self.offset < other.end() && other.offset < self.end()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundType {
    pub members: Vec<CompoundMember>,
}

impl CompoundType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member at an explicit offset, rejecting duplicate names and overlaps.
    pub fn insert(
        &mut self, name: &str, offset: usize, dtype: &TypeDescriptor,
    ) -> Result<(), TypeError> {
        validate_name(name)?;
        if self.member(name).is_some() {
            return Err(TypeError::DuplicateName(name.to_owned()));
        }
        let member = CompoundMember::new(name, offset, dtype.clone());
        if let Some(other) = self.members.iter().find(|m| m.overlaps(&member)) {
            return Err(TypeError::Overlap { first: other.name.clone(), second: member.name });
        }
        self.members.push(member);
        Ok(())
    }

    /// Adds a member right after the current last byte.
    pub fn append(&mut self, name: &str, dtype: &TypeDescriptor) -> Result<(), TypeError> {
        let offset = self.end();
        self.insert(name, offset, dtype)
    }

    pub fn member(&self, name: &str) -> Option<&CompoundMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Smallest compound size able to hold all members.
    pub fn end(&self) -> usize {
        self.members.iter().map(CompoundMember::end).max().unwrap_or(0)
    }

    /// Sum of the member sizes.
    pub fn member_size(&self) -> usize {
        self.members.iter().map(CompoundMember::size).sum()
    }

    /// True if the members tile `size` bytes with no gaps, recursively.
    pub fn is_packed(&self, size: usize) -> bool {
        self.member_size() == size
            && self.end() == size
            && Self::find_overlap(&self.members).is_none()
            && self.members.iter().all(|m| match &m.dtype.kind {
                TypeKind::Compound(ct) => ct.is_packed(m.dtype.size),
                _ => true,
            })
    }

    /// Moves members to consecutive offsets in their current offset order, removing all
    /// padding; nested compounds are packed first and shrink accordingly.
    pub fn pack(&mut self) {
        self.members.sort_by_key(|m| m.offset);
        let mut offset = 0;
        for member in &mut self.members {
            if let TypeKind::Compound(ct) = &mut member.dtype.kind {
                ct.pack();
                member.dtype.size = ct.end();
            }
            member.offset = offset;
            offset += member.dtype.size;
        }
    }

    /// Returns the indices of some pair of overlapping members, if there is one.
    ///
    /// The first index refers to the member that starts earlier.
    pub fn find_overlap(members: &[CompoundMember]) -> Option<(usize, usize)> {
        let mut order: Vec<usize> = (0..members.len()).filter(|&i| members[i].size() > 0).collect();
        order.sort_by_key(|&i| members[i].offset);
        let mut widest: Option<usize> = None;
        for i in order {
            if let Some(w) = widest {
                if members[i].offset < members[w].end() {
                    return Some((w, i));
                }
                if members[i].end() > members[w].end() {
                    widest = Some(i);
                }
            } else {
                widest = Some(i);
            }
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    /// Raw value, exactly as many bytes as the base type.
    pub value: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumType {
    pub base: Box<TypeDescriptor>,
    pub members: Vec<EnumMember>,
}

impl EnumType {
    /// Empty enumeration over an integer base type.
    pub fn new(base: &TypeDescriptor) -> Result<Self, TypeError> {
        match base.kind {
            TypeKind::Integer(_) => Ok(Self { base: Box::new(base.clone()), members: vec![] }),
            _ => Err(TypeError::NotInteger(base.class())),
        }
    }

    pub fn insert(&mut self, name: &str, value: &[u8]) -> Result<(), TypeError> {
        validate_name(name)?;
        if value.len() != self.base.size {
            return Err(TypeError::ValueSize { expected: self.base.size, actual: value.len() });
        }
        if self.members.iter().any(|m| m.name == name) {
            return Err(TypeError::DuplicateName(name.to_owned()));
        }
        if self.members.iter().any(|m| m.value == value) {
            return Err(TypeError::DuplicateValue(name.to_owned()));
        }
        self.members.push(EnumMember { name: name.to_owned(), value: value.to_vec() });
        Ok(())
    }

    /// Adds a member whose value is laid out according to the base integer type.
    pub fn insert_value(&mut self, name: &str, value: i64) -> Result<(), TypeError> {
        let raw = self.encode_value(value)?;
        self.insert(name, &raw)
    }

    /// Reads back the value of a member as an integer.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        let member = self.members.iter().find(|m| m.name == name)?;
        let it = match &self.base.kind {
            TypeKind::Integer(it) => it,
            _ => return None,
        };
        let (offset, prec) = (it.atomic.offset, it.atomic.precision);
        if prec == 0 || prec > 64 || offset + prec > 8 * member.value.len() {
            return None;
        }
        let mut raw = member.value.clone();
        if it.atomic.order == ByteOrder::BigEndian {
            raw.reverse();
        }
        let bits = bits::get_as_integer(&raw, offset, prec);
        Some(match it.sign {
            Sign::TwosComplement => ((bits << (64 - prec)) as i64) >> (64 - prec),
            Sign::None => bits as i64,
        })
    }

    fn encode_value(&self, value: i64) -> Result<Vec<u8>, TypeError> {
        let it = match &self.base.kind {
            TypeKind::Integer(it) => it,
            _ => return Err(TypeError::NotInteger(self.base.class())),
        };
        let (offset, prec, size) = (it.atomic.offset, it.atomic.precision, self.base.size);
        if prec == 0 || prec > 64 || offset + prec > 8 * size {
            return Err(TypeError::ValueOutOfRange(value));
        }
        let fits = match (it.sign, prec) {
            (_, 64) => it.sign == Sign::TwosComplement || value >= 0,
            (Sign::TwosComplement, p) => {
                let half = 1i64 << (p - 1);
                value >= -half && value < half
            }
            (Sign::None, p) => value >= 0 && (value as u64) < (1u64 << p),
        };
        if !fits {
            return Err(TypeError::ValueOutOfRange(value));
        }

        let mut raw = vec![0u8; size];
        bits::set_from_integer(&mut raw, offset, prec, value as u64);
        if it.atomic.lsb_pad == Pad::One {
            bits::set(&mut raw, 0, offset, true);
        }
        if it.atomic.msb_pad == Pad::One {
            bits::set(&mut raw, offset + prec, 8 * size - offset - prec, true);
        }
        if it.atomic.order == ByteOrder::BigEndian {
            raw.reverse();
        }
        Ok(raw)
    }
}
