//! `registry` contains the static block/item/enchantment/effect/biome catalog a [`BlockFactory`](crate::BlockFactory) reads from.
//!
//! The document shape follows minecraft-data, bundled into one json file per game version.
//! Everything is indexed once on load and never mutated afterwards.

use crate::{
    config::{Edition, Format, StateEncoding, VersionInfo},
    error::Result,
};
use ahash::AHashMap;
use fixedbitset::FixedBitSet;
use serde::{
    Deserialize,
    de::{Deserializer, MapAccess, Visitor},
};
use std::{collections::BTreeMap, fmt};

/// An axis aligned box, `[min_x, min_y, min_z, max_x, max_y, max_z]`
pub type Shape = [f64; 6];

/// How a single state dimension stores its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Enum,
    Bool,
    Int,
    #[serde(other)]
    Other,
}

/// One dimension of a block's state space, like `facing` or `waterlogged`.
///
/// The order these appear in on a [`BlockDescriptor`] is the positional order of the state id encoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateDimension {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub num_values: u32,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A pre-flattening metadata variant of a block, like granite for stone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub metadata: u32,
    pub display_name: String,
    #[serde(skip)]
    pub shapes: Option<Vec<Shape>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDescriptor {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub hardness: Option<f64>,
    #[serde(default)]
    pub diggable: bool,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default, rename = "harvestTools")]
    harvest_tools_raw: Option<BTreeMap<String, bool>>,
    /// Tool item ids that can harvest this block, `None` means anything can
    #[serde(skip)]
    pub harvest_tools: Option<FixedBitSet>,
    #[serde(default)]
    pub drops: Vec<serde_json::Value>,
    #[serde(default)]
    min_state_id: Option<u32>,
    #[serde(default)]
    max_state_id: Option<u32>,
    #[serde(default)]
    default_state: Option<u32>,
    #[serde(default)]
    pub states: Vec<StateDimension>,
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(skip)]
    pub shapes: Vec<Shape>,
    #[serde(skip)]
    pub state_shapes: Option<Vec<Vec<Shape>>>,
}

impl BlockDescriptor {
    pub fn min_state_id(&self) -> u32 {
        self.min_state_id.unwrap_or_default()
    }

    pub fn max_state_id(&self) -> u32 {
        self.max_state_id.unwrap_or(self.min_state_id())
    }

    pub fn default_state(&self) -> u32 {
        self.default_state.unwrap_or(self.min_state_id())
    }

    /// Amount of distinct configurations declared by [`BlockDescriptor::states`]
    pub fn state_count(&self) -> u32 {
        self.states.iter().map(|s| s.num_values).product()
    }
}

/// An item, enchantment or effect entry, all of them are just looked up by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomeDescriptor {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub rainfall: f32,
    #[serde(default)]
    pub dimension: String,
}

/// The property record of a single bedrock state id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BedrockState {
    pub name: String,
    #[serde(default)]
    pub states: BTreeMap<String, BedrockStateValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BedrockStateValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ShapeRef {
    Single(u32),
    PerState(Vec<u32>),
}

#[derive(Debug, Clone, Deserialize)]
struct CollisionShapes {
    blocks: BTreeMap<String, ShapeRef>,
    shapes: BTreeMap<String, Vec<Shape>>,
}

impl CollisionShapes {
    fn shape(&self, id: u32) -> Option<&Vec<Shape>> {
        self.shapes.get(&id.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryData {
    version: VersionInfo,
    blocks: Vec<BlockDescriptor>,
    #[serde(default)]
    materials: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    items: Vec<NamedEntry>,
    #[serde(default)]
    enchantments: Vec<NamedEntry>,
    #[serde(default)]
    effects: Vec<NamedEntry>,
    #[serde(default)]
    biomes: Vec<BiomeDescriptor>,
    #[serde(default, deserialize_with = "ordered_pairs")]
    legacy_blocks: Vec<(String, String)>,
    #[serde(default)]
    block_states: Vec<BedrockState>,
    #[serde(default)]
    collision_shapes: Option<CollisionShapes>,
}

/// Indexed catalog for one game version.
#[derive(Debug, Clone)]
pub struct Registry {
    pub version: VersionInfo,
    format: Format,
    blocks: Vec<BlockDescriptor>,
    blocks_by_id: AHashMap<u32, usize>,
    blocks_by_name: AHashMap<String, usize>,
    /// `(min_state_id, max_state_id, index)` sorted by `min_state_id`
    state_ranges: Vec<(u32, u32, usize)>,
    materials: AHashMap<String, AHashMap<u32, f64>>,
    items_by_name: AHashMap<String, NamedEntry>,
    enchantments_by_name: AHashMap<String, NamedEntry>,
    effects_by_name: AHashMap<String, NamedEntry>,
    biomes: AHashMap<u32, BiomeDescriptor>,
    legacy_blocks: Vec<(String, String)>,
    block_states: Vec<BedrockState>,
}

impl Registry {
    /// Parses and indexes a registry document.
    ///
    /// ## Example
    /// ```no_run
    /// let registry = Registry::from_json(&std::fs::read_to_string("pc_1_20.json")?)?;
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let data: RegistryData = serde_json::from_str(json)?;
        Ok(Self::from_data(data))
    }

    fn from_data(data: RegistryData) -> Self {
        let format = Format::from_version(&data.version);
        let mut blocks = data.blocks;

        for block in blocks.iter_mut() {
            if format.encoding == StateEncoding::Legacy && block.min_state_id.is_none() {
                // pre-flattening ids are (id << 4) | metadata with 16 metadata slots
                block.min_state_id = Some(block.id << 4);
                block.max_state_id = Some((block.id << 4) + 15);
            }

            block.harvest_tools = block.harvest_tools_raw.as_ref().map(|tools| {
                let ids: Vec<usize> = tools
                    .iter()
                    .filter(|(_, allowed)| **allowed)
                    .filter_map(|(id, _)| id.parse().ok())
                    .collect();
                let mut set = FixedBitSet::with_capacity(ids.iter().max().map_or(0, |m| m + 1));
                for id in ids {
                    set.insert(id);
                }
                set
            });
        }

        if let Some(shapes) = &data.collision_shapes {
            prepare_shapes(&mut blocks, shapes, format.edition);
        }

        let mut blocks_by_id = AHashMap::with_capacity(blocks.len());
        let mut blocks_by_name = AHashMap::with_capacity(blocks.len());
        let mut state_ranges = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            blocks_by_id.insert(block.id, index);
            blocks_by_name.insert(block.name.clone(), index);
            if block.min_state_id.is_some() {
                state_ranges.push((block.min_state_id(), block.max_state_id(), index));
            }
        }
        state_ranges.sort_by_key(|(min, _, _)| *min);

        let materials = data
            .materials
            .into_iter()
            .map(|(material, tools)| {
                let tools = tools
                    .into_iter()
                    .filter_map(|(id, speed)| Some((id.parse::<u32>().ok()?, speed)))
                    .collect();
                (material, tools)
            })
            .collect();

        let by_name = |entries: Vec<NamedEntry>| -> AHashMap<String, NamedEntry> {
            entries.into_iter().map(|e| (e.name.clone(), e)).collect()
        };

        Self {
            version: data.version,
            format,
            blocks,
            blocks_by_id,
            blocks_by_name,
            state_ranges,
            materials,
            items_by_name: by_name(data.items),
            enchantments_by_name: by_name(data.enchantments),
            effects_by_name: by_name(data.effects),
            biomes: data.biomes.into_iter().map(|b| (b.id, b)).collect(),
            legacy_blocks: data.legacy_blocks,
            block_states: data.block_states,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn blocks(&self) -> &[BlockDescriptor] {
        &self.blocks
    }

    pub fn block(&self, id: u32) -> Option<&BlockDescriptor> {
        self.blocks_by_id.get(&id).map(|i| &self.blocks[*i])
    }

    pub fn block_by_name(&self, name: &str) -> Option<&BlockDescriptor> {
        self.blocks_by_name.get(name).map(|i| &self.blocks[*i])
    }

    /// Finds the block type whose state range contains `state_id`
    pub fn block_by_state_id(&self, state_id: u32) -> Option<&BlockDescriptor> {
        let after = self
            .state_ranges
            .partition_point(|(min, _, _)| *min <= state_id);
        let (_, max, index) = self.state_ranges.get(after.checked_sub(1)?)?;
        (state_id <= *max).then(|| &self.blocks[*index])
    }

    /// Tool id to speed multiplier for a material, like `mineable/pickaxe`
    pub fn material(&self, material: &str) -> Option<&AHashMap<u32, f64>> {
        self.materials.get(material)
    }

    pub fn item_by_name(&self, name: &str) -> Option<&NamedEntry> {
        self.items_by_name.get(name)
    }

    pub fn enchantment_by_name(&self, name: &str) -> Option<&NamedEntry> {
        self.enchantments_by_name.get(name)
    }

    pub fn effect_by_name(&self, name: &str) -> Option<&NamedEntry> {
        self.effects_by_name.get(name)
    }

    pub fn biome(&self, id: u32) -> Option<&BiomeDescriptor> {
        self.biomes.get(&id)
    }

    /// The `"id:meta" -> "minecraft:name[props]"` catalog, in document order
    pub fn legacy_blocks(&self) -> &[(String, String)] {
        &self.legacy_blocks
    }

    pub fn block_state(&self, state_id: u32) -> Option<&BedrockState> {
        self.block_states.get(state_id as usize)
    }
}

/// Resolves collision shape references into the descriptors.
fn prepare_shapes(blocks: &mut [BlockDescriptor], shapes: &CollisionShapes, edition: Edition) {
    for block in blocks.iter_mut() {
        let shape_ref = shapes.blocks.get(&block.name);

        let default = match shape_ref {
            Some(ShapeRef::Single(id)) => shapes.shape(*id),
            Some(ShapeRef::PerState(ids)) => ids.first().and_then(|id| shapes.shape(*id)),
            None => None,
        };
        block.shapes = match default {
            Some(s) => s.clone(),
            None => {
                tracing::error!(block = %block.name, "no collision shape found for block");
                Vec::new()
            }
        };

        if !block.states.is_empty() || edition == Edition::Bedrock {
            if let Some(ShapeRef::PerState(ids)) = shape_ref {
                block.state_shapes = Some(
                    ids.iter()
                        .map(|id| shapes.shape(*id).cloned().unwrap_or_default())
                        .collect(),
                );
            }
        } else {
            for variation in block.variations.iter_mut() {
                variation.shapes = match shape_ref {
                    Some(ShapeRef::PerState(ids)) => ids
                        .get(variation.metadata as usize)
                        .and_then(|id| shapes.shape(*id))
                        .cloned(),
                    Some(ShapeRef::Single(id)) => shapes.shape(*id).cloned(),
                    None => None,
                };
            }
        }
    }
}

/// Keeps the document order of a json object, the legacy catalog resolves ties by it.
fn ordered_pairs<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairVisitor;

    impl<'de> Visitor<'de> for PairVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of \"id:meta\" to block state strings")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(pair) = map.next_entry::<String, String>()? {
                pairs.push(pair);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairVisitor)
}
