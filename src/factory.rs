//! `factory` contains [`BlockFactory`], the entry point for turning state ids, property maps
//! and block strings into [`Block`] values.

use crate::{
    block::Block,
    codec,
    config::{Format, StateEncoding},
    error::{Error, Result},
    hash,
    legacy::LegacyStates,
    property::{Properties, PropertyValue},
    registry::{BlockDescriptor, Registry},
};
use std::{fmt, sync::Arc};

/// Builds [`Block`]s for one registry.
///
/// Cloning is cheap, every clone shares the same registry & lookup tables.
/// Factories for different game versions never share anything.
#[derive(Clone)]
pub struct BlockFactory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    registry: Arc<Registry>,
    format: Format,
    legacy: LegacyStates,
}

/// A block type given either by numeric id or by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef<'a> {
    Id(u32),
    Name(&'a str),
}

impl From<u32> for BlockRef<'_> {
    fn from(value: u32) -> Self {
        BlockRef::Id(value)
    }
}

impl<'a> From<&'a str> for BlockRef<'a> {
    fn from(value: &'a str) -> Self {
        BlockRef::Name(value)
    }
}

impl fmt::Display for BlockRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Id(id) => write!(f, "{id}"),
            BlockRef::Name(name) => write!(f, "{name}"),
        }
    }
}

impl BlockFactory {
    /// Creates a factory, resolving the data format & building the legacy lookup tables once.
    ///
    /// ## Example
    /// ```no_run
    /// let registry = Registry::from_json(&std::fs::read_to_string("pc_1_20.json")?)?;
    /// let blocks = BlockFactory::new(Arc::new(registry));
    /// let stone = blocks.from_state_id(1, 0);
    /// ```
    pub fn new(registry: Arc<Registry>) -> Self {
        let format = registry.format();
        let legacy = LegacyStates::new(registry.legacy_blocks());

        Self {
            inner: Arc::new(FactoryInner {
                registry,
                format,
                legacy,
            }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn format(&self) -> Format {
        self.inner.format
    }

    pub(crate) fn legacy(&self) -> &LegacyStates {
        &self.inner.legacy
    }

    /// Builds a block from a numeric state id.
    ///
    /// Never fails, an id the registry doesn't know gives a placeholder block with an empty name.
    /// Legacy ids are read as `(type << 4) | metadata`.
    pub fn from_state_id(&self, state_id: u32, biome_id: u32) -> Block {
        match self.format().encoding {
            StateEncoding::Legacy => {
                Block::new(self, Some(state_id >> 4), biome_id, state_id & 15, Some(state_id))
            }
            StateEncoding::Flattened | StateEncoding::Bedrock => {
                Block::new(self, None, biome_id, 0, Some(state_id))
            }
        }
    }

    /// Builds a block from its type and a set of properties.
    ///
    /// Properties the block doesn't declare are ignored on flattened registries.
    ///
    /// ## Example
    /// ```no_run
    /// let stairs = blocks.from_properties("oak_stairs", &properties([("facing", "east")]), 0)?;
    /// ```
    pub fn from_properties<'a, B: Into<BlockRef<'a>>>(
        &self,
        block: B,
        properties: &Properties,
        biome_id: u32,
    ) -> Result<Block> {
        let block = block.into();
        let registry = self.registry();
        let descriptor = match block {
            BlockRef::Id(id) => registry.block(id),
            BlockRef::Name(name) => registry.block_by_name(name),
        }
        .ok_or_else(|| Error::NoMatchingBlock {
            block: block.to_string(),
            properties: properties.clone(),
        })?;

        match self.format().encoding {
            StateEncoding::Flattened => self.from_flattened(descriptor, properties, biome_id),
            StateEncoding::Legacy if !descriptor.states.is_empty() => {
                self.from_flattened(descriptor, properties, biome_id)
            }
            StateEncoding::Legacy => {
                let id_meta = self.legacy().resolve(&descriptor.name, properties)?;
                Ok(Block::new(self, Some(id_meta.id), biome_id, id_meta.metadata, None))
            }
            StateEncoding::Bedrock => Ok(self.from_bedrock(descriptor, properties, biome_id)),
        }
    }

    fn from_flattened(
        &self,
        descriptor: &BlockDescriptor,
        properties: &Properties,
        biome_id: u32,
    ) -> Result<Block> {
        // an offset past the last configuration would land on another block's states
        let state_id = codec::encode(&descriptor.states, properties)
            .filter(|offset| descriptor.states.is_empty() || *offset < descriptor.state_count())
            .and_then(|offset| descriptor.min_state_id().checked_add(offset))
            .ok_or_else(|| Error::NoMatchingState {
                name: descriptor.name.clone(),
                properties: properties.clone(),
            })?;
        Ok(Block::new(self, None, biome_id, 0, Some(state_id)))
    }

    /// First state of the block whose listed values equal every requested property
    fn from_bedrock(&self, descriptor: &BlockDescriptor, properties: &Properties, biome_id: u32) -> Block {
        let registry = self.registry();
        for state_id in descriptor.min_state_id()..=descriptor.max_state_id() {
            let Some(state) = registry.block_state(state_id) else {
                continue;
            };
            let matched = properties.iter().all(|(name, wanted)| {
                state
                    .states
                    .get(name)
                    .is_some_and(|s| PropertyValue::from(&s.value) == *wanted)
            });
            if matched {
                return Block::new(self, None, biome_id, 0, Some(state_id));
            }
        }

        tracing::debug!(
            block = %descriptor.name,
            properties = ?properties,
            "no bedrock state matched, using the base block"
        );
        Block::from_descriptor(self, descriptor, biome_id)
    }

    /// Parses a block string and builds the block it names.
    ///
    /// Accepts `name[key=value,...]` where every value stays a string, and the older
    /// `name["key":value,...]` where values are quoted strings, `true`/`false` (as `1`/`0`) or integers.
    /// The `minecraft:` namespace is optional.
    ///
    /// ## Example
    /// ```no_run
    /// let candle = blocks.from_string("minecraft:candle[lit=true]", 0)?;
    /// let same = blocks.from_string(r#"candle["lit":true]"#, 0)?;
    /// ```
    pub fn from_string(&self, block: &str, biome_id: u32) -> Result<Block> {
        let (name, properties) = parse_block_string(block)?;
        self.from_properties(name, &properties, biome_id)
    }

    /// Canonical hash of a block, `None` if this registry doesn't identify blocks by hash
    pub fn hash(&self, name: &str, properties: &Properties) -> Option<i32> {
        self.format()
            .block_hashes
            .then(|| hash::block_hash(name, properties))
    }
}

impl fmt::Debug for BlockFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockFactory")
            .field("version", &self.registry().version.minecraft_version)
            .field("format", &self.format())
            .finish()
    }
}

/// Splits a block string into its name and properties
fn parse_block_string(block: &str) -> Result<(&str, Properties)> {
    let invalid = || Error::InvalidBlockString(block.to_owned());
    let stripped = block.strip_prefix("minecraft:").unwrap_or(block);

    let Some((name, rest)) = stripped.split_once('[') else {
        return Ok((stripped, Properties::new()));
    };
    let body = rest.strip_suffix(']').ok_or_else(invalid)?;
    if body.is_empty() {
        return Ok((name, Properties::new()));
    }

    let mut properties = Properties::new();
    if stripped.contains("[\"") {
        for entry in body.split(',') {
            let (key, value) = entry.split_once(':').ok_or_else(invalid)?;
            let key = key.trim_matches('"');
            let value = match value {
                "true" => PropertyValue::Int(1),
                "false" => PropertyValue::Int(0),
                v if v.starts_with('"') => PropertyValue::Str(v.trim_matches('"').to_owned()),
                v => PropertyValue::Int(v.parse().map_err(|_| invalid())?),
            };
            properties.insert(key.to_owned(), value);
        }
    } else {
        for entry in body.split(',') {
            let (key, value) = entry.split_once('=').ok_or_else(invalid)?;
            properties.insert(key.to_owned(), PropertyValue::Str(value.to_owned()));
        }
    }

    Ok((name, properties))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{DigConditions, Effects, Enchantment, block_hash, fixtures, property::properties};

    #[test]
    fn parse_bracket_form() -> Result<()> {
        let (name, props) = parse_block_string("minecraft:candle[lit=true,candles=2]")?;
        assert_eq!(name, "candle");
        assert_eq!(props, properties([("lit", "true"), ("candles", "2")]));
        Ok(())
    }

    #[test]
    fn parse_quoted_form() -> Result<()> {
        let (name, props) = parse_block_string(r#"candle["lit":true,"candles":3,"color":"red"]"#)?;
        assert_eq!(name, "candle");
        assert_eq!(
            props,
            properties([
                ("lit", PropertyValue::Int(1)),
                ("candles", PropertyValue::Int(3)),
                ("color", "red".into()),
            ])
        );
        Ok(())
    }

    #[test]
    fn parse_without_properties() -> Result<()> {
        assert_eq!(parse_block_string("minecraft:stone")?, ("stone", Properties::new()));
        assert_eq!(parse_block_string("stone[]")?, ("stone", Properties::new()));
        Ok(())
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["candle[lit]", "candle[lit=true", r#"candle["lit":maybe]"#] {
            assert!(
                matches!(parse_block_string(bad), Err(Error::InvalidBlockString(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn flattened_state_ids() -> Result<()> {
        let blocks = fixtures::pc_1_20()?;
        let stairs = blocks.from_state_id(36, 1);
        assert_eq!(stairs.name, "oak_stairs");
        assert_eq!(stairs.type_id, Some(60));
        assert_eq!(stairs.metadata, 11);
        assert_eq!(stairs.biome.name, "plains");
        assert_eq!(
            stairs.properties(),
            properties([
                ("facing", PropertyValue::from("north")),
                ("half", "bottom".into()),
                ("shape", "straight".into()),
                ("waterlogged", false.into()),
            ])
        );
        Ok(())
    }

    #[test]
    fn flattened_from_properties() -> Result<()> {
        let blocks = fixtures::pc_1_20()?;
        let stairs = blocks.from_properties(
            "oak_stairs",
            &properties([("facing", "south"), ("half", "bottom"), ("waterlogged", "false")]),
            0,
        )?;
        // min 25 + facing 20 + half 10 + waterlogged 1
        assert_eq!(stairs.state_id, Some(56));

        let by_id = blocks.from_properties(60u32, &properties([("facing", "south")]), 0)?;
        assert_eq!(by_id.state_id, Some(45));

        let stone = blocks.from_properties("stone", &Properties::new(), 0)?;
        assert_eq!(stone.state_id, Some(1));
        Ok(())
    }

    #[test]
    fn candle_in_both_string_forms() -> Result<()> {
        let blocks = fixtures::pc_1_20()?;
        let bracket = blocks.from_string("minecraft:candle[lit=true]", 0)?;
        let quoted = blocks.from_string(r#"minecraft:candle["lit":true]"#, 0)?;
        assert_eq!(bracket.state_id, quoted.state_id);
        assert_eq!(bracket.properties().get("lit"), Some(&PropertyValue::Bool(true)));

        let unlit = blocks.from_string(r#"candle["lit":false]"#, 0)?;
        assert_eq!(unlit.properties().get("lit"), Some(&PropertyValue::Bool(false)));
        assert_ne!(unlit.state_id, bracket.state_id);
        Ok(())
    }

    #[test]
    fn out_of_range_ints_fail() -> Result<()> {
        let blocks = fixtures::pc_1_20()?;
        for input in [
            "candle[candles=4294967295]",
            "candle[candles=1073741824]",
            "candle[candles=4]",
            r#"candle["candles":4294967295]"#,
            r#"candle["candles":99999999999]"#,
        ] {
            assert!(
                matches!(
                    blocks.from_string(input, 0),
                    Err(Error::NoMatchingState { ref name, .. }) if name == "candle"
                ),
                "{input}"
            );
        }

        let last = blocks.from_string("candle[candles=3,lit=false,waterlogged=false]", 0)?;
        assert_eq!(last.state_id, Some(152));
        assert_eq!(last.name, "candle");
        Ok(())
    }

    #[test]
    fn unknown_state_id_is_a_placeholder() -> Result<()> {
        let blocks = fixtures::pc_1_20()?;
        let block = blocks.from_state_id(60_000, 0);
        assert_eq!(block.name, "");
        assert_eq!(block.state_id, Some(60_000));
        assert_eq!(block.type_id, None);
        assert!(block.shapes.is_empty());
        assert_eq!(block.hardness, 0.0);
        assert!(block.transparent);
        assert!(!block.diggable);
        assert!(block.properties().is_empty());
        Ok(())
    }

    #[test]
    fn unknown_block_names_fail() -> Result<()> {
        let blocks = fixtures::pc_1_20()?;
        let err = blocks
            .from_properties("not_a_block", &properties([("lit", "true")]), 0)
            .expect_err("unknown block");
        assert!(matches!(err, Error::NoMatchingBlock { ref block, .. } if block == "not_a_block"));
        assert!(matches!(
            blocks.from_string("minecraft:not_a_block", 0),
            Err(Error::NoMatchingBlock { .. })
        ));
        Ok(())
    }

    #[test]
    fn legacy_state_ids() -> Result<()> {
        let blocks = fixtures::pc_1_8()?;
        let granite = blocks.from_state_id((1 << 4) | 1, 0);
        assert_eq!(granite.name, "stone");
        assert_eq!(granite.type_id, Some(1));
        assert_eq!(granite.metadata, 1);
        assert_eq!(granite.display_name, "Granite");
        assert_eq!(granite.properties(), properties([("variant", "granite")]));
        Ok(())
    }

    #[test]
    fn legacy_from_properties() -> Result<()> {
        let blocks = fixtures::pc_1_8()?;
        let lever = blocks.from_properties("lever", &properties([("facing", "west")]), 0)?;
        assert_eq!((lever.type_id, lever.metadata), (Some(69), 2));
        assert_eq!(lever.state_id, Some((69 << 4) | 2));

        let wool = blocks.from_string("minecraft:wool[color=orange]", 0)?;
        assert_eq!(wool.metadata, 1);

        assert!(matches!(
            blocks.from_properties("wool", &properties([("color", "lime")]), 0),
            Err(Error::NoMatchingState { .. })
        ));
        Ok(())
    }

    #[test]
    fn bedrock_property_search() -> Result<()> {
        let blocks = fixtures::bedrock_1_20()?;
        let planks = blocks.from_properties("planks", &properties([("wood_type", "birch")]), 0)?;
        assert_eq!(planks.state_id, Some(12));

        // bits are stored as bytes so only the quoted form matches them
        let candle = blocks.from_string(r#"candle["candles":2,"lit":true]"#, 0)?;
        assert_eq!(candle.state_id, Some(19 + 2 * 2 + 1));
        Ok(())
    }

    #[test]
    fn bedrock_unmatched_search_gives_base_block() -> Result<()> {
        let blocks = fixtures::bedrock_1_20()?;
        let candle = blocks.from_string("candle[lit=true]", 0)?;
        assert_eq!(candle.name, "candle");
        assert_eq!(candle.type_id, Some(667));
        assert_eq!(candle.state_id, None);
        assert!(candle.properties().is_empty());
        assert_eq!(candle.hash, None);
        Ok(())
    }

    #[test]
    fn bedrock_hashes() -> Result<()> {
        let blocks = fixtures::bedrock_1_20()?;
        assert_eq!(blocks.from_string("minecraft:soul_soil", 0)?.hash, Some(601701031));
        assert_eq!(
            blocks.from_string(r#"minecraft:planks["wood_type":"oak"]"#, 0)?.hash,
            Some(1835335165)
        );
        assert_eq!(blocks.from_state_id(1, 0).hash, Some(-1177000405));
        assert_eq!(blocks.hash("stone", &properties([("stone_type", "granite")])), Some(-1177000405));
        Ok(())
    }

    #[test]
    fn hashes_only_when_supported() -> Result<()> {
        let blocks = fixtures::pc_1_20()?;
        assert_eq!(blocks.from_state_id(1, 0).hash, None);
        assert_eq!(blocks.hash("stone", &Properties::new()), None);
        Ok(())
    }

    #[test]
    fn factories_are_independent() -> Result<()> {
        let modern = fixtures::pc_1_20()?;
        let legacy = fixtures::pc_1_8()?;
        assert_eq!(modern.from_state_id(17, 0).name, "water");
        assert_eq!(legacy.from_state_id(17, 0).display_name, "Granite");
        assert_eq!(modern.format().encoding, StateEncoding::Flattened);
        assert_eq!(legacy.format().encoding, StateEncoding::Legacy);
        assert!(modern.legacy().is_empty());
        assert!(!legacy.legacy().is_empty());
        Ok(())
    }

    #[test]
    fn repeated_calls_agree() -> Result<()> {
        let blocks = fixtures::pc_1_20()?;
        let pickaxe = blocks.registry().item_by_name("iron_pickaxe").map(|i| i.id);
        let wanted = properties([("facing", "south"), ("half", "top"), ("waterlogged", "true")]);
        let snapshot = wanted.clone();

        let first = blocks.from_properties("oak_stairs", &wanted, 0)?;
        let again = blocks.from_properties("oak_stairs", &wanted, 0)?;
        assert_eq!(wanted, snapshot);
        assert_eq!(first.state_id, again.state_id);
        assert_eq!(first.properties(), again.properties());

        let by_id = blocks.from_state_id(7, 0);
        let by_id_again = blocks.from_state_id(7, 0);
        assert_eq!(by_id.state_id, by_id_again.state_id);
        assert_eq!(by_id.name, by_id_again.name);
        assert_eq!(by_id.properties(), by_id_again.properties());

        let input = "minecraft:iron_ore";
        let ore = blocks.from_string(input, 0)?;
        let ore_again = blocks.from_string(input, 0)?;
        assert_eq!(ore.state_id, ore_again.state_id);
        let conditions = DigConditions {
            in_water: true,
            ..Default::default()
        };
        let enchantments = [Enchantment::new("efficiency", 3)];
        assert_eq!(
            ore.dig_time(pickaxe, conditions, &enchantments, &Effects::new()).to_bits(),
            ore_again.dig_time(pickaxe, conditions, &enchantments, &Effects::new()).to_bits()
        );

        let bedrock = fixtures::bedrock_1_20()?;
        let planks = r#"minecraft:planks["wood_type":"oak"]"#;
        let hashed = bedrock.from_string(planks, 0)?;
        let hashed_again = bedrock.from_string(planks, 0)?;
        assert_eq!(hashed.state_id, hashed_again.state_id);
        assert_eq!(hashed.hash, hashed_again.hash);
        assert_eq!(hashed.properties(), hashed_again.properties());

        let granite = properties([("stone_type", "granite")]);
        assert_eq!(block_hash("stone", &granite), block_hash("stone", &granite));
        assert_eq!(granite, properties([("stone_type", "granite")]));
        Ok(())
    }
}
