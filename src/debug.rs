//! Multi-line diagnostic dump of a datatype tree.

use std::fmt::{self, Display};

use hdf5_dtype_types::{
    AtomicInfo, ByteOrder, CharacterSet, Location, Normalization, Pad, ReferenceKind, Sign,
    StringPadding, TypeDescriptor, TypeKind, VarLenKind,
};

/// Default width of the label column.
pub const DEFAULT_FIELD_WIDTH: usize = 24;

/// Nested types are indented by this much, and their label column shrinks by as much.
const NESTED_INDENT: usize = 3;

/// Displays a datatype as one `label value` line per field, recursing into members and
/// base types.
///
/// ```
/// use hdf5_dtype::types::{ByteOrder, TypeDescriptor};
/// use hdf5_dtype::Dump;
///
/// let dt = TypeDescriptor::integer(2, ByteOrder::BigEndian, false);
/// let text = Dump::new(&dt).field_width(12).to_string();
/// assert!(text.starts_with("Type class:  integer\nSize:        2 bytes\n"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Dump<'a> {
    dtype: &'a TypeDescriptor,
    indent: usize,
    fwidth: usize,
}

impl<'a> Dump<'a> {
    pub fn new(dtype: &'a TypeDescriptor) -> Self {
        Self { dtype, indent: 0, fwidth: DEFAULT_FIELD_WIDTH }
    }

    /// Number of spaces before every line.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Width of the label column.
    pub fn field_width(mut self, fwidth: usize) -> Self {
        self.fwidth = fwidth;
        self
    }

    fn nested(&self, dtype: &'a TypeDescriptor) -> Self {
        Self {
            dtype,
            indent: self.indent + NESTED_INDENT,
            fwidth: self.fwidth.saturating_sub(NESTED_INDENT),
        }
    }

    fn field(&self, f: &mut fmt::Formatter, label: &str, value: impl Display) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{:<fwidth$} {}",
            "",
            label,
            value,
            indent = self.indent,
            fwidth = self.fwidth
        )
    }

    fn line(&self, f: &mut fmt::Formatter, text: &str) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", text, indent = self.indent)
    }

    fn atomic(&self, f: &mut fmt::Formatter, atomic: &AtomicInfo) -> fmt::Result {
        let order = match atomic.order {
            ByteOrder::LittleEndian => "little endian",
            ByteOrder::BigEndian => "big endian",
            ByteOrder::Vax => "VAX",
            ByteOrder::None => "none",
        };
        self.field(f, "Byte order:", order)?;
        self.field(f, "Precision:", plural(atomic.precision, "bit"))?;
        self.field(f, "Offset:", plural(atomic.offset, "bit"))?;
        self.field(f, "Low pad type:", pad_name(atomic.lsb_pad))?;
        self.field(f, "High pad type:", pad_name(atomic.msb_pad))
    }

    fn string(
        &self, f: &mut fmt::Formatter, pad: StringPadding, cset: CharacterSet,
    ) -> fmt::Result {
        let cset = match cset {
            CharacterSet::Ascii => "ASCII".to_owned(),
            CharacterSet::Utf8 => "UTF-8".to_owned(),
            CharacterSet::Reserved(code) => format!("reserved ({})", code),
        };
        self.field(f, "Character Set:", cset)?;
        let pad = match pad {
            StringPadding::NullTerm => "NULL Terminated".to_owned(),
            StringPadding::NullPad => "NULL Padded".to_owned(),
            StringPadding::SpacePad => "Space Padded".to_owned(),
            StringPadding::Reserved(code) => format!("reserved ({})", code),
        };
        self.field(f, "String Padding:", pad)
    }
}

fn plural(n: usize, unit: &str) -> String {
    format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" })
}

fn pad_name(pad: Pad) -> &'static str {
    match pad {
        Pad::Zero => "zero",
        Pad::One => "one",
    }
}

fn location_name(location: Location) -> &'static str {
    match location {
        Location::Undefined => "undefined",
        Location::Memory => "memory",
        Location::Disk => "disk",
    }
}

impl<'a> Display for Dump<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dtype = self.dtype;
        self.field(f, "Type class:", dtype.class())?;
        self.field(f, "Size:", plural(dtype.size, "byte"))?;
        self.field(f, "Version:", dtype.version)?;

        match &dtype.kind {
            TypeKind::Compound(ct) => {
                self.field(f, "Number of members:", ct.members.len())?;
                for (i, member) in ct.members.iter().enumerate() {
                    self.field(f, &format!("Member {}:", i), &member.name)?;
                    let nested = self.nested(&member.dtype);
                    nested.field(f, "Byte offset:", member.offset)?;
                    write!(f, "{}", nested)?;
                }
            }
            TypeKind::Enum(et) => {
                self.line(f, "Base type:")?;
                write!(f, "{}", self.nested(&et.base))?;
                self.field(f, "Number of members:", et.members.len())?;
                for (i, member) in et.members.iter().enumerate() {
                    self.field(f, &format!("Member {}:", i), &member.name)?;
                    let hex: String = member.value.iter().map(|b| format!("{:02x}", b)).collect();
                    self.field(f, "Raw bytes of value:", format!("0x{}", hex))?;
                }
            }
            TypeKind::Opaque(ot) => self.field(f, "Tag:", format!("\"{}\"", ot.tag_lossy()))?,
            TypeKind::Reference(rt) => {
                let kind = match rt.kind {
                    ReferenceKind::Object => "object",
                    ReferenceKind::DatasetRegion => "dataset region",
                    ReferenceKind::Object2 => "object (v2)",
                    ReferenceKind::DatasetRegion2 => "dataset region (v2)",
                    ReferenceKind::Attribute => "attribute",
                };
                self.field(f, "Reference type:", kind)?;
                self.field(f, "Location:", location_name(rt.location))?;
            }
            TypeKind::String(st) => self.string(f, st.pad, st.cset)?,
            TypeKind::VarLen(vt) => {
                let kind = if vt.is_string() { "string" } else { "sequence" };
                self.field(f, "Vlen type:", kind)?;
                self.field(f, "Location:", location_name(vt.location))?;
                match vt.kind {
                    VarLenKind::String { pad, cset } => self.string(f, pad, cset)?,
                    VarLenKind::Sequence => {
                        self.line(f, "Base type:")?;
                        write!(f, "{}", self.nested(&vt.base))?;
                    }
                }
            }
            TypeKind::Array(at) => {
                self.field(f, "Rank:", at.rank())?;
                let dims: Vec<_> = at.dims.iter().map(ToString::to_string).collect();
                self.field(f, "Dim Size:", format!("{{{}}}", dims.join(", ")))?;
                self.line(f, "Base type:")?;
                write!(f, "{}", self.nested(&at.base))?;
            }
            TypeKind::Float(ft) => {
                self.atomic(f, &ft.atomic)?;
                self.field(f, "Internal pad type:", pad_name(ft.pad))?;
                let norm = match ft.norm {
                    Normalization::Implied => "implied",
                    Normalization::MsbSet => "msb set",
                    Normalization::None => "none",
                };
                self.field(f, "Normalization:", norm)?;
                self.field(f, "Sign bit location:", ft.sign_pos)?;
                self.field(f, "Exponent location:", ft.exp_pos)?;
                self.field(f, "Exponent bias:", format!("0x{:08x}", ft.exp_bias))?;
                self.field(f, "Exponent size:", ft.exp_size)?;
                self.field(f, "Mantissa location:", ft.mant_pos)?;
                self.field(f, "Mantissa size:", ft.mant_size)?;
            }
            TypeKind::Integer(it) => {
                self.atomic(f, &it.atomic)?;
                let sign = match it.sign {
                    Sign::None => "none",
                    Sign::TwosComplement => "2's comp",
                };
                self.field(f, "Sign scheme:", sign)?;
            }
            TypeKind::Bitfield(bt) => self.atomic(f, &bt.atomic)?,
            TypeKind::Time(_) => {
                if let Some(atomic) = dtype.atomic() {
                    self.atomic(f, &atomic)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use hdf5_dtype_types::{CompoundType, TypeDescriptor as TD};
    use pretty_assertions::assert_eq;
    use unindent::unindent;

    #[test]
    pub fn test_integer() {
        let dt = TD::integer(4, ByteOrder::LittleEndian, true);
        let expected = unindent(
            "
            Type class:  integer
            Size:        4 bytes
            Version:     1
            Byte order:  little endian
            Precision:   32 bits
            Offset:      0 bits
            Low pad type: zero
            High pad type: zero
            Sign scheme: 2's comp
        ",
        );
        assert_eq!(Dump::new(&dt).field_width(12).to_string(), expected);
    }

    #[test]
    pub fn test_compound_nesting() {
        let mut ct = CompoundType::new();
        ct.insert("s", 2, &TD::fixed_string(1, StringPadding::NullPad, CharacterSet::Utf8)).unwrap();
        let dt = TD::compound(3, ct).unwrap();
        let expected = unindent(
            "
            Type class:        compound
            Size:              3 bytes
            Version:           1
            Number of members: 1
            Member 0:          s
               Byte offset:    2
               Type class:     text string
               Size:           1 byte
               Version:        1
               Character Set:  UTF-8
               String Padding: NULL Padded
        ",
        );
        assert_eq!(Dump::new(&dt).field_width(18).to_string(), expected);
    }

    #[test]
    pub fn test_indent() {
        let dt = TD::reference(8, ReferenceKind::Object);
        let text = Dump::new(&dt).indent(2).field_width(0).to_string();
        assert_eq!(
            text,
            "  Type class: reference\n  Size: 8 bytes\n  Version: 1\n  \
             Reference type: object\n  Location: undefined\n"
        );
    }
}
