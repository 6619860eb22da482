//! `hash` computes the canonical FNV-1a 32 block hash some wire formats identify blocks by.

use crate::{block::populate_namespace, nbt::write_block_identity, property::Properties};
use bytes::BytesMut;

/// FNV-1a 32-bit offset basis.
const FNV1_32_INIT: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime.
const FNV1_32_PRIME: u32 = 0x0100_0193;

/// Compute FNV-1a 32-bit hash of a byte slice.
pub fn fnv1a_32(data: &[u8]) -> u32 {
    let mut hash = FNV1_32_INIT;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV1_32_PRIME);
    }
    hash
}

/// Hash of a block name and its properties.
///
/// The name gets the `minecraft:` namespace if it has none, properties are hashed sorted by key.
///
/// ## Example
/// ```no_run
/// assert_eq!(block_hash("soul_soil", &Properties::new()), 601701031);
/// ```
pub fn block_hash(name: &str, properties: &Properties) -> i32 {
    let name = populate_namespace(name);
    let mut buf = BytesMut::new();
    write_block_identity(&mut buf, &name, properties);
    fnv1a_32(&buf) as i32
}
