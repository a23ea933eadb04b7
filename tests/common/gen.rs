use std::fmt;
use std::iter;

use rand::distributions::Alphanumeric;
use rand::prelude::{Rng, SliceRandom};

use hdf5_dtype::globals::{VAX_F32, VAX_F64};
use hdf5_dtype::types::{
    AtomicInfo, BitfieldType, ByteOrder, CharacterSet, CompoundType, EnumType, IntegerType, Pad,
    ReferenceKind, Sign, StringPadding, TypeDescriptor as TD, TypeKind,
};

pub fn gen_ascii<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    iter::repeat(()).map(|_| rng.sample(Alphanumeric)).map(char::from).take(len).collect()
}

pub trait Gen: Sized + fmt::Debug {
    fn gen<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl Gen for ByteOrder {
    fn gen<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *[ByteOrder::LittleEndian, ByteOrder::BigEndian].choose(rng).unwrap()
    }
}

impl Gen for Pad {
    fn gen<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *[Pad::Zero, Pad::One].choose(rng).unwrap()
    }
}

impl Gen for StringPadding {
    fn gen<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StringPadding::from_code(rng.gen_range(0..4))
    }
}

impl Gen for CharacterSet {
    fn gen<R: Rng + ?Sized>(rng: &mut R) -> Self {
        CharacterSet::from_code(rng.gen_range(0..3))
    }
}

impl Gen for TD {
    fn gen<R: Rng + ?Sized>(rng: &mut R) -> Self {
        gen_dtype(rng, 0)
    }
}

fn node(size: usize, kind: TypeKind) -> TD {
    TD { version: kind.min_version(), size, kind }
}

/// Random significant bit range within `size` bytes.
pub fn gen_atomic<R: Rng + ?Sized>(rng: &mut R, size: usize) -> AtomicInfo {
    let precision = rng.gen_range(1..=8 * size);
    let offset = rng.gen_range(0..=8 * size - precision);
    AtomicInfo {
        order: Gen::gen(rng),
        offset,
        precision,
        lsb_pad: Gen::gen(rng),
        msb_pad: Gen::gen(rng),
    }
}

pub fn gen_atomic_dtype<R: Rng + ?Sized>(rng: &mut R) -> TD {
    let size = *[1, 2, 4, 8].choose(rng).unwrap();
    match rng.gen_range(0..7) {
        0 => {
            let sign = *[Sign::None, Sign::TwosComplement].choose(rng).unwrap();
            node(size, TypeKind::Integer(IntegerType { atomic: gen_atomic(rng, size), sign }))
        }
        1 => match (rng.gen_bool(0.2), rng.gen::<bool>()) {
            (true, true) => VAX_F32.clone(),
            (true, false) => VAX_F64.clone(),
            (false, true) => TD::ieee_f32(Gen::gen(rng)),
            (false, false) => TD::ieee_f64(Gen::gen(rng)),
        },
        2 => TD::time(size, Gen::gen(rng)),
        3 => TD::fixed_string(rng.gen_range(1..20), Gen::gen(rng), Gen::gen(rng)),
        4 => node(size, TypeKind::Bitfield(BitfieldType { atomic: gen_atomic(rng, size) })),
        5 => {
            let len = rng.gen_range(0..20);
            TD::opaque(size, &gen_ascii(rng, len)).unwrap()
        }
        _ => {
            let kind = ReferenceKind::from_code(rng.gen_range(0..5)).unwrap();
            TD::reference(8, kind)
        }
    }
}

pub fn gen_compound<R: Rng + ?Sized>(rng: &mut R, depth: usize) -> TD {
    let mut ct = CompoundType::new();
    let mut offset = 0;
    for i in 0..rng.gen_range(1..5) {
        let dtype = gen_dtype(rng, depth + 1);
        offset += rng.gen_range(0..4);
        let len = rng.gen_range(0..12);
        // the trailing index keeps names unique
        let name = format!("{}{}", gen_ascii(rng, len), i);
        ct.insert(&name, offset, &dtype).unwrap();
        offset += dtype.size;
    }
    TD::compound(offset + rng.gen_range(0..4), ct).unwrap()
}

pub fn gen_enum<R: Rng + ?Sized>(rng: &mut R) -> TD {
    let size = *[1, 2, 4].choose(rng).unwrap();
    let mut et = EnumType::new(&TD::integer(size, Gen::gen(rng), rng.gen())).unwrap();
    for i in 0..rng.gen_range(1..6) {
        let len = rng.gen_range(0..6);
        et.insert_value(&format!("{}{}", gen_ascii(rng, len), i), i).unwrap();
    }
    TD::enumeration(et).unwrap()
}

/// Random datatype tree; nodes at `depth` 3 and below are always atomic.
pub fn gen_dtype<R: Rng + ?Sized>(rng: &mut R, depth: usize) -> TD {
    if depth >= 3 || rng.gen_bool(0.4) {
        return gen_atomic_dtype(rng);
    }
    match rng.gen_range(0..5) {
        0 | 1 => gen_compound(rng, depth),
        2 => gen_enum(rng),
        3 => {
            if rng.gen() {
                TD::vlen_sequence(&gen_dtype(rng, depth + 1))
            } else {
                TD::vlen_string(Gen::gen(rng), Gen::gen(rng))
            }
        }
        _ => {
            let rank = rng.gen_range(1..=3);
            let dims: Vec<u32> = (0..rank).map(|_| rng.gen_range(1..4)).collect();
            TD::array(&gen_dtype(rng, depth + 1), &dims).unwrap()
        }
    }
}
