#![doc = include_str!("../readme.md")]

mod biome;
mod block;
pub mod codec;
mod config;
mod dig;
mod entity;
mod error;
mod factory;
mod hash;
mod legacy;
pub mod nbt;
mod property;
pub mod registry;

#[cfg(test)]
mod fixtures;

pub use biome::Biome;
pub use block::Block;
pub use config::{Edition, Format, StateEncoding, VersionInfo};
pub use dig::{DigConditions, Effect, Effects, Enchantment};
pub use entity::{BlockKind, EntityExtension, SignText};
pub use error::{Error, Result};
pub use factory::{BlockFactory, BlockRef};
pub use hash::{block_hash, fnv1a_32};
pub use legacy::{IdMeta, LegacyStates};
pub use property::{Properties, PropertyValue, matches_any_filter, matches_filter, properties};
pub use registry::Registry;
