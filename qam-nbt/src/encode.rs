//! Tag tree encoder

use crate::{ByteOrder, FormatError, Tag, TagCompound, TagType};

/// Root name written into the file framing. Readers skip it.
const ROOT_NAME: &str = "qam";

/// Encode a complete file: 0x0A discriminator, root name, root compound.
///
/// The output is the raw tag stream; gzip wrapping is a transport concern
/// layered on top by the caller.
pub fn encode_file(root: &TagCompound, order: ByteOrder) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::new();
    out.push(TagType::Compound.as_byte());
    put_str(&mut out, ROOT_NAME, order)?;
    put_compound(&mut out, root, order)?;
    Ok(out)
}

/// Encode a bare value payload (no type byte, no name).
pub fn encode_payload(tag: &Tag, order: ByteOrder) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::new();
    put_payload(&mut out, tag, order)?;
    Ok(out)
}

fn put_payload(out: &mut Vec<u8>, tag: &Tag, order: ByteOrder) -> Result<(), FormatError> {
    match tag {
        Tag::Byte(v) => out.push(*v as u8),
        Tag::Short(v) => put_u16(out, *v as u16, order),
        Tag::Int(v) => put_u32(out, *v as u32, order),
        Tag::Long(v) => put_u64(out, *v as u64, order),
        Tag::Float(v) => put_u32(out, v.to_bits(), order),
        Tag::Double(v) => put_u64(out, v.to_bits(), order),
        Tag::String(v) => put_str(out, v, order)?,
        Tag::ByteArray(v) => {
            put_len(out, v.len(), order);
            out.extend(v.iter().map(|x| *x as u8));
        }
        Tag::ShortArray(v) => {
            put_len(out, v.len(), order);
            for x in v {
                put_u16(out, *x as u16, order);
            }
        }
        Tag::UShortArray(v) => {
            put_len(out, v.len(), order);
            for x in v {
                put_u16(out, *x, order);
            }
        }
        Tag::IntArray(v) => {
            put_len(out, v.len(), order);
            for x in v {
                put_u32(out, *x as u32, order);
            }
        }
        Tag::LongArray(v) => {
            put_len(out, v.len(), order);
            for x in v {
                put_u64(out, *x as u64, order);
            }
        }
        Tag::FloatArray(v) => {
            put_len(out, v.len(), order);
            for x in v {
                put_u32(out, x.to_bits(), order);
            }
        }
        Tag::List(list) => {
            out.push(list.elem_type().as_byte());
            put_len(out, list.len(), order);
            for item in list.iter() {
                let found = item.tag_type();
                if found != list.elem_type() {
                    return Err(FormatError::HeterogeneousList {
                        expected: list.elem_type(),
                        found,
                    });
                }
                put_payload(out, item, order)?;
            }
        }
        Tag::Compound(compound) => put_compound(out, compound, order)?,
    }
    Ok(())
}

fn put_compound(
    out: &mut Vec<u8>,
    compound: &TagCompound,
    order: ByteOrder,
) -> Result<(), FormatError> {
    for (name, value) in compound.iter() {
        out.push(value.tag_type().as_byte());
        put_str(out, name, order)?;
        put_payload(out, value, order)?;
    }
    out.push(TagType::End.as_byte());
    Ok(())
}

fn put_str(out: &mut Vec<u8>, s: &str, order: ByteOrder) -> Result<(), FormatError> {
    if s.len() > u16::MAX as usize {
        return Err(FormatError::StringTooLong(s.len()));
    }
    put_u16(out, s.len() as u16, order);
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn put_len(out: &mut Vec<u8>, len: usize, order: ByteOrder) {
    put_u32(out, len as u32, order);
}

#[inline]
fn put_u16(out: &mut Vec<u8>, v: u16, order: ByteOrder) {
    match order {
        ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
    }
}

#[inline]
fn put_u32(out: &mut Vec<u8>, v: u32, order: ByteOrder) {
    match order {
        ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
    }
}

#[inline]
fn put_u64(out: &mut Vec<u8>, v: u64, order: ByteOrder) {
    match order {
        ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
    }
}
