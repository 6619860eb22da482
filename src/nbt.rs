//! `nbt` contains the NBT helpers used around blocks, the little-endian identity writer for block hashes
//! and [`simplify`] for turning block entity payloads into plain json.

use crate::{
    error::{Error, Result},
    property::Properties,
};
use bytes::BufMut;
use simdnbt::owned::{Nbt, NbtCompound, NbtList, NbtTag};
use std::io::Cursor;

pub(crate) const TAG_END: u8 = 0x00;
pub(crate) const TAG_STRING: u8 = 0x08;
pub(crate) const TAG_COMPOUND: u8 = 0x0A;

/// Writes a little-endian NBT string, `u16` length followed by the bytes.
///
/// Anything past `u16::MAX` bytes is cut off so the prefix always matches what follows.
fn put_string(buf: &mut impl BufMut, value: &str) {
    let bytes = value.as_bytes();
    let len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
    buf.put_u16_le(len);
    buf.put_slice(&bytes[..usize::from(len)]);
}

/// Writes the `{ name, states }` compound a block hash is computed over.
///
/// Property values carry no tag type here, every property is a bare `TAG_End` id followed by its key.
/// `properties` iterate sorted by key, which the hash depends on.
pub(crate) fn write_block_identity(buf: &mut impl BufMut, name: &str, properties: &Properties) {
    buf.put_u8(TAG_COMPOUND);
    put_string(buf, "");

    buf.put_u8(TAG_STRING);
    put_string(buf, "name");
    put_string(buf, name);

    buf.put_u8(TAG_COMPOUND);
    put_string(buf, "states");
    for key in properties.keys() {
        buf.put_u8(TAG_END);
        put_string(buf, key);
    }
    buf.put_u8(TAG_END);

    buf.put_u8(TAG_END);
}

/// Reads a raw big-endian block entity payload.
pub fn read_compound(bytes: &[u8]) -> Result<NbtCompound> {
    match simdnbt::owned::read(&mut Cursor::new(bytes))? {
        Nbt::Some(nbt) => Ok(nbt.as_compound()),
        Nbt::None => Err(Error::InvalidNbtType("base_nbt")),
    }
}

/// Drops all NBT type information, compounds become objects & lists become arrays.
pub fn simplify(compound: &NbtCompound) -> serde_json::Value {
    serde_json::Value::Object(
        compound
            .iter()
            .map(|(k, v)| (k.to_str().into_owned(), simplify_tag(v)))
            .collect(),
    )
}

fn simplify_tag(tag: &NbtTag) -> serde_json::Value {
    use serde_json::Value;

    match tag {
        NbtTag::Byte(v) => Value::from(*v),
        NbtTag::Short(v) => Value::from(*v),
        NbtTag::Int(v) => Value::from(*v),
        NbtTag::Long(v) => Value::from(*v),
        NbtTag::Float(v) => Value::from(*v),
        NbtTag::Double(v) => Value::from(*v),
        NbtTag::ByteArray(v) => Value::from(v.clone()),
        NbtTag::String(v) => Value::from(v.as_str().to_str().into_owned()),
        NbtTag::List(list) => simplify_list(list),
        NbtTag::Compound(compound) => simplify(compound),
        NbtTag::IntArray(v) => Value::from(v.clone()),
        NbtTag::LongArray(v) => Value::from(v.clone()),
    }
}

fn simplify_list(list: &NbtList) -> serde_json::Value {
    use serde_json::Value;

    match list {
        NbtList::Empty => Value::Array(Vec::new()),
        NbtList::Byte(v) => Value::from(v.clone()),
        NbtList::Short(v) => Value::from(v.clone()),
        NbtList::Int(v) => Value::from(v.clone()),
        NbtList::Long(v) => Value::from(v.clone()),
        NbtList::Float(v) => Value::from(v.clone()),
        NbtList::Double(v) => Value::from(v.clone()),
        NbtList::ByteArray(v) => Value::from(v.clone()),
        NbtList::String(v) => v
            .iter()
            .map(|s| Value::from(s.as_str().to_str().into_owned()))
            .collect(),
        NbtList::List(v) => v.iter().map(simplify_list).collect(),
        NbtList::Compound(v) => v.iter().map(simplify).collect(),
        NbtList::IntArray(v) => Value::from(v.clone()),
        NbtList::LongArray(v) => Value::from(v.clone()),
    }
}
