//! Registry documents shared by the unit tests.

use crate::{BlockFactory, Result, registry::Registry};
use std::sync::Arc;

/// Flattened pc registry, every block has a contiguous state id range
pub const PC_1_20: &str = include_str!("../fixtures/pc_1_20.json");
/// Pre-flattening pc registry with a legacy `id:meta` catalog
pub const PC_1_8: &str = include_str!("../fixtures/pc_1_8.json");
/// Bedrock registry with per-state property records & block hashes
pub const BEDROCK_1_20: &str = include_str!("../fixtures/bedrock_1_20.json");

pub fn pc_1_20() -> Result<BlockFactory> {
    factory(PC_1_20)
}

pub fn pc_1_8() -> Result<BlockFactory> {
    factory(PC_1_8)
}

pub fn bedrock_1_20() -> Result<BlockFactory> {
    factory(BEDROCK_1_20)
}

fn factory(json: &str) -> Result<BlockFactory> {
    Ok(BlockFactory::new(Arc::new(Registry::from_json(json)?)))
}
