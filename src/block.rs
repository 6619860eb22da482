//! `block` contains the [`Block`] value produced by a [`BlockFactory`] and its associated functions.

use crate::{
    biome::Biome,
    codec,
    config::StateEncoding,
    entity::{BlockKind, SignText},
    error::{Error, Result},
    factory::BlockFactory,
    nbt,
    property::{Properties, PropertyValue, matches_any_filter, matches_filter},
    registry::{BlockDescriptor, Shape},
};
use fixedbitset::FixedBitSet;
use simdnbt::owned::NbtCompound;
use std::{borrow::Cow, fmt::Debug};

/// A Minecraft [Block](https://minecraft.wiki/w/Block) resolved against a registry.
///
/// Built through [`BlockFactory::from_state_id`], [`BlockFactory::from_properties`] or [`BlockFactory::from_string`].
/// A state id the registry doesn't know still gives a block, just with an empty `name`,
/// no shapes, `hardness` 0, transparent and not diggable.
#[derive(Clone)]
pub struct Block {
    /// Numeric block type, `None` when nothing resolved it
    pub type_id: Option<u32>,
    pub state_id: Option<u32>,
    /// Offset of this configuration inside the type's state range
    pub metadata: u32,
    pub light: u8,
    pub sky_light: u8,
    pub position: Option<(i32, i32, i32)>,
    pub biome: Biome,
    /// Raw block entity payload, see [`Block::block_entity`]
    pub entity: Option<NbtCompound>,
    /// Extra properties merged over the decoded ones by [`Block::properties`]
    pub computed_states: Properties,

    pub name: String,
    pub display_name: String,
    pub hardness: f64,
    pub material: Option<String>,
    /// Tool item ids that can harvest this block, `None` means anything can
    pub harvest_tools: Option<FixedBitSet>,
    pub transparent: bool,
    pub diggable: bool,
    pub drops: Vec<serde_json::Value>,
    pub shapes: Vec<Shape>,
    /// The per-state shape table had no entry for this metadata and shape 0 was used instead
    pub missing_state_shape: bool,
    pub is_waterlogged: bool,
    pub kind: BlockKind,
    /// Canonical hash, only on registries that identify blocks by hash
    pub hash: Option<i32>,

    properties: Properties,
    factory: BlockFactory,
}

impl Block {
    /// Resolves a block from a state id, or from `type_id` + `metadata` when there's no state id
    pub(crate) fn new(
        factory: &BlockFactory,
        type_id: Option<u32>,
        biome_id: u32,
        metadata: u32,
        state_id: Option<u32>,
    ) -> Self {
        let registry = factory.registry();
        let format = factory.format();

        let state_id = match (state_id, type_id) {
            (Some(state_id), _) => Some(state_id),
            // keep the metadata inside the type's state range
            (None, Some(type_id)) => registry
                .block(type_id)
                .map(|b| (b.min_state_id() + metadata).min(b.max_state_id())),
            (None, None) => None,
        };

        let mut block = Self::placeholder(factory, type_id, biome_id, metadata, state_id);
        let descriptor = state_id.and_then(|id| registry.block_by_state_id(id));

        match (descriptor, state_id) {
            (Some(descriptor), Some(state_id)) => {
                block.metadata = state_id - descriptor.min_state_id();
                block.apply_descriptor(descriptor);
                block.select_shapes(descriptor);
            }
            _ => tracing::debug!(?state_id, ?type_id, "unknown block state, using a placeholder"),
        }

        block.properties = match format.encoding {
            StateEncoding::Flattened => match descriptor {
                Some(descriptor) if !descriptor.states.is_empty() => {
                    codec::decode(&descriptor.states, block.metadata)
                }
                _ => Properties::new(),
            },
            StateEncoding::Legacy => match block.type_id {
                Some(type_id) => factory.legacy().properties(type_id, block.metadata),
                None => Properties::new(),
            },
            StateEncoding::Bedrock => state_id
                .and_then(|id| registry.block_state(id))
                .map(|state| {
                    state
                        .states
                        .iter()
                        .map(|(name, s)| (name.clone(), PropertyValue::from(&s.value)))
                        .collect()
                })
                .unwrap_or_default(),
        };

        block.is_waterlogged = block
            .properties
            .get("waterlogged")
            .and_then(PropertyValue::as_bool)
            .unwrap_or(false);

        if descriptor.is_some() {
            block.hash = factory.hash(&block.name, &block.properties);
        }

        block
    }

    /// A block built straight from a descriptor, without any state
    pub(crate) fn from_descriptor(factory: &BlockFactory, descriptor: &BlockDescriptor, biome_id: u32) -> Self {
        let mut block = Self::placeholder(factory, Some(descriptor.id), biome_id, 0, None);
        block.apply_descriptor(descriptor);
        block
    }

    fn placeholder(
        factory: &BlockFactory,
        type_id: Option<u32>,
        biome_id: u32,
        metadata: u32,
        state_id: Option<u32>,
    ) -> Self {
        Block {
            type_id,
            state_id,
            metadata,
            light: 0,
            sky_light: 0,
            position: None,
            biome: Biome::new(factory.registry(), biome_id),
            entity: None,
            computed_states: Properties::new(),
            name: String::new(),
            display_name: String::new(),
            hardness: 0.0,
            material: None,
            harvest_tools: None,
            transparent: true,
            diggable: false,
            drops: Vec::new(),
            shapes: Vec::new(),
            missing_state_shape: false,
            is_waterlogged: false,
            kind: BlockKind::Plain,
            hash: None,
            properties: Properties::new(),
            factory: factory.clone(),
        }
    }

    fn apply_descriptor(&mut self, descriptor: &BlockDescriptor) {
        self.type_id = Some(descriptor.id);
        self.name = descriptor.name.clone();
        self.display_name = descriptor.display_name.clone();
        self.hardness = descriptor.hardness.unwrap_or(0.0);
        self.material = descriptor.material.clone();
        self.harvest_tools = descriptor.harvest_tools.clone();
        self.transparent = descriptor.transparent;
        self.diggable = descriptor.diggable;
        self.drops = descriptor.drops.clone();
        self.shapes = descriptor.shapes.clone();
        self.kind = BlockKind::from_name(&descriptor.name);
    }

    fn select_shapes(&mut self, descriptor: &BlockDescriptor) {
        if let Some(state_shapes) = &descriptor.state_shapes {
            match state_shapes.get(self.metadata as usize) {
                Some(shapes) => self.shapes = shapes.clone(),
                None => {
                    self.shapes = state_shapes.first().cloned().unwrap_or_default();
                    self.missing_state_shape = true;
                }
            }
        } else if let Some(variation) = descriptor
            .variations
            .iter()
            .rev()
            .find(|v| v.metadata == self.metadata)
        {
            self.display_name = variation.display_name.clone();
            if let Some(shapes) = &variation.shapes {
                self.shapes = shapes.clone();
            }
        }
    }

    /// The decoded properties with [`Block::computed_states`] merged over them
    pub fn properties(&self) -> Properties {
        let mut properties = self.properties.clone();
        properties.extend(
            self.computed_states
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        properties
    }

    /// Metadata of this block with `changes` applied, the block itself stays as is.
    ///
    /// Only legacy registries support this, anything else is an [`Error::NotImplemented`].
    ///
    /// ## Example
    /// ```no_run
    /// let lever = blocks.from_string("lever[facing=east]", 0)?;
    /// let metadata = lever.change_properties(&properties([("powered", true)]))?;
    /// ```
    pub fn change_properties(&self, changes: &Properties) -> Result<u32> {
        match self.factory.format().encoding {
            StateEncoding::Legacy => {
                let Some(type_id) = self.type_id else {
                    return Err(Error::NoMatchingLegacyState {
                        name: self.name.clone(),
                        properties: changes.clone(),
                        last_found: None,
                    });
                };
                self.factory
                    .legacy()
                    .change(&self.name, type_id, &self.properties, changes)
            }
            encoding => Err(Error::NotImplemented(encoding)),
        }
    }

    /// Checks the properties against a `key=a|b,key2=c` filter, see [`matches_filter`]
    pub fn matches(&self, filter: &str) -> bool {
        matches_filter(&self.properties(), filter)
    }

    /// True when any of `filters` matches, see [`matches_any_filter`]
    pub fn matches_any(&self, filters: &[&str]) -> bool {
        matches_any_filter(&self.properties(), filters)
    }

    /// The block entity payload without any NBT type information
    pub fn block_entity(&self) -> Option<serde_json::Value> {
        self.entity.as_ref().map(nbt::simplify)
    }

    /// Replaces the block entity payload with a raw uncompressed NBT payload
    pub fn set_entity_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.entity = Some(nbt::read_compound(bytes)?);
        Ok(())
    }

    /// Text of a sign block.
    ///
    /// Fails on blocks that aren't signs or don't have a block entity yet.
    pub fn sign_text(&self) -> Result<SignText> {
        let extension = self
            .kind
            .extension()
            .ok_or_else(|| Error::NoExtension(self.name.clone()))?;
        let entity = self
            .entity
            .as_ref()
            .ok_or_else(|| Error::MissingBlockEntity(self.name.clone()))?;

        Ok(extension
            .text(entity, self.factory.format().edition)
            .unwrap_or_default())
    }

    /// Writes sign text into the block entity, creating an empty payload if there's none
    pub fn set_sign_text(&mut self, text: &SignText) -> Result<()> {
        let extension = self
            .kind
            .extension()
            .ok_or_else(|| Error::NoExtension(self.name.clone()))?;
        let edition = self.factory.format().edition;
        let entity = self.entity.get_or_insert_with(NbtCompound::new);
        extension.set_text(entity, edition, text);
        Ok(())
    }

    pub(crate) fn factory(&self) -> &BlockFactory {
        &self.factory
    }
}

/// Populates a namespace to the id if none is given.
///
/// Defaults to `minecraft:<id>`
pub(crate) fn populate_namespace(id: &str) -> Cow<'_, str> {
    if !id.contains(':') {
        Cow::Owned(String::from("minecraft:") + id)
    } else {
        Cow::Borrowed(id)
    }
}

impl Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // "<name>#<state>[<key>=<value>, ...]", a bit like a block string but not quite
        let properties = self.properties();
        write!(
            f,
            "{}#{}{}",
            populate_namespace(&self.name),
            self.state_id.map_or_else(|| "?".to_owned(), |s| s.to_string()),
            if properties.is_empty() {
                "".to_owned()
            } else {
                format!(
                    "[{}]",
                    properties
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
        )
    }
}
