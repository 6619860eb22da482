//! `legacy` maps pre-flattening `id:metadata` blocks to and from their named properties.
//!
//! Both lookup tables are built once from the registry's legacy catalog and only read afterwards.

use crate::{
    error::{Error, Result},
    property::{Properties, PropertyValue, parse_state_string, to_state_string},
};
use ahash::AHashMap;
use std::fmt;

/// A legacy block id together with its 0-15 metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdMeta {
    pub id: u32,
    pub metadata: u32,
}

impl IdMeta {
    /// Parses the catalog's `"id:meta"` keys
    pub fn parse(value: &str) -> Option<Self> {
        let (id, metadata) = value.split_once(':')?;
        Some(Self {
            id: id.parse().ok()?,
            metadata: metadata.parse().ok()?,
        })
    }
}

impl fmt::Display for IdMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.metadata)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LegacyStates {
    /// block name to its `(state string, id:meta)` variants, in catalog order
    by_name: AHashMap<String, Vec<(String, IdMeta)>>,
    /// every catalog entry with its parsed properties, in catalog order
    by_id_meta: Vec<(IdMeta, Properties)>,
    index: AHashMap<IdMeta, usize>,
}

impl LegacyStates {
    /// Builds the lookup tables from `"id:meta" -> "minecraft:name[key=value,...]"` pairs
    pub fn new(catalog: &[(String, String)]) -> Self {
        let mut states = Self::default();

        for (key, name) in catalog {
            let Some(id_meta) = IdMeta::parse(key) else {
                tracing::warn!(key = %key, "skipping malformed legacy catalog key");
                continue;
            };

            let name = name.strip_prefix("minecraft:").unwrap_or(name);
            let (block, state) = match name.split_once('[') {
                Some((block, rest)) => (block, rest.trim_end_matches(']')),
                None => (name, ""),
            };

            let variants = states.by_name.entry(block.to_owned()).or_default();
            match variants.iter_mut().find(|(s, _)| s == state) {
                Some(variant) => variant.1 = id_meta,
                None => variants.push((state.to_owned(), id_meta)),
            }

            let properties = parse_state_string(state);
            match states.index.get(&id_meta) {
                Some(i) => states.by_id_meta[*i].1 = properties,
                None => {
                    states.index.insert(id_meta, states.by_id_meta.len());
                    states.by_id_meta.push((id_meta, properties));
                }
            }
        }

        states
    }

    pub fn is_empty(&self) -> bool {
        self.by_id_meta.is_empty()
    }

    /// Properties of `id:metadata`, falling back to `id:0` and then to nothing
    pub fn properties(&self, id: u32, metadata: u32) -> Properties {
        let lookup = |metadata| self.index.get(&IdMeta { id, metadata });
        match lookup(metadata) {
            Some(i) => self.by_id_meta[*i].1.clone(),
            None => {
                tracing::trace!(id, metadata, "no legacy state, trying metadata 0");
                lookup(0)
                    .map(|i| self.by_id_meta[*i].1.clone())
                    .unwrap_or_default()
            }
        }
    }

    /// Finds the first variant of `name` whose state string contains every requested `key=value`.
    ///
    /// Matching is by substring and the first hit in catalog order wins.
    pub fn resolve(&self, name: &str, requested: &Properties) -> Result<IdMeta> {
        let wanted: Vec<String> = requested.iter().map(|(k, v)| format!("{k}={v}")).collect();

        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .find(|(state, _)| wanted.iter().all(|w| state.contains(w.as_str())))
            .map(|(_, id_meta)| *id_meta)
            .ok_or_else(|| Error::NoMatchingState {
                name: name.to_owned(),
                properties: requested.clone(),
            })
    }

    /// Merges `changes` into `current` and returns the metadata of the exactly matching state of `type_id`.
    pub fn change(
        &self,
        name: &str,
        type_id: u32,
        current: &Properties,
        changes: &Properties,
    ) -> Result<u32> {
        let mut merged = current.clone();
        for (key, value) in changes {
            let value = match value {
                PropertyValue::Bool(b) => PropertyValue::Str(b.to_string()),
                other => other.clone(),
            };
            merged.insert(key.clone(), value);
        }
        let wanted = to_state_string(&merged);

        let mut last_found = None;
        for (id_meta, state) in self.by_id_meta.iter().filter(|(i, _)| i.id == type_id) {
            if to_state_string(state) == wanted {
                return Ok(id_meta.metadata);
            }
            last_found = Some(state);
        }

        Err(Error::NoMatchingLegacyState {
            name: name.to_owned(),
            properties: changes.clone(),
            last_found: last_found.cloned(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{fixtures, property::properties, registry::Registry};

    fn states() -> Result<LegacyStates> {
        let registry = Registry::from_json(fixtures::PC_1_8)?;
        Ok(LegacyStates::new(registry.legacy_blocks()))
    }

    #[test]
    fn parse_id_meta() {
        assert_eq!(IdMeta::parse("69:10"), Some(IdMeta { id: 69, metadata: 10 }));
        assert_eq!(IdMeta::parse("69"), None);
        assert_eq!(IdMeta { id: 3, metadata: 1 }.to_string(), "3:1");
    }

    #[test]
    fn properties_by_id_meta() -> Result<()> {
        let states = states()?;
        assert_eq!(
            states.properties(3, 1),
            properties([("snowy", "false"), ("variant", "coarse_dirt")])
        );
        assert_eq!(states.properties(63, 2), properties([("rotation", 2i64)]));
        // unknown metadata falls back to metadata 0
        assert_eq!(states.properties(35, 9), properties([("color", "white")]));
        assert!(states.properties(15, 0).is_empty());
        assert!(states.properties(4000, 0).is_empty());
        Ok(())
    }

    #[test]
    fn first_catalog_match_wins() -> Result<()> {
        let states = states()?;
        let lever = states.resolve("lever", &properties([("facing", "east")]))?;
        assert_eq!(lever, IdMeta { id: 69, metadata: 1 });

        let powered = states.resolve("lever", &properties([("powered", true)]))?;
        assert_eq!(powered, IdMeta { id: 69, metadata: 8 });

        let plain = states.resolve("dirt", &Properties::new())?;
        assert_eq!(plain, IdMeta { id: 3, metadata: 0 });
        Ok(())
    }

    #[test]
    fn resolve_matches_key_value_pairs() -> Result<()> {
        let states = states()?;
        // "variant=granite" is not a substring of "variant=smooth_granite"
        let granite = states.resolve("stone", &properties([("variant", "granite")]))?;
        assert_eq!(granite, IdMeta { id: 1, metadata: 1 });
        Ok(())
    }

    #[test]
    fn resolve_failure_reports_request() -> Result<()> {
        let states = states()?;
        let err = states
            .resolve("wool", &properties([("color", "lime")]))
            .expect_err("no lime wool in the catalog");
        let message = err.to_string();
        assert!(message.contains("wool"));
        assert!(message.contains("\"color\": \"lime\""));
        Ok(())
    }

    #[test]
    fn change_needs_exact_match() -> Result<()> {
        let states = states()?;
        let current = states.properties(69, 0);
        let metadata = states.change("lever", 69, &current, &properties([("powered", true)]))?;
        assert_eq!(metadata, 8);

        let current = states.properties(3, 0);
        let metadata = states.change("dirt", 3, &current, &properties([("variant", "podzol")]))?;
        assert_eq!(metadata, 2);
        Ok(())
    }

    #[test]
    fn change_failure_reports_last_candidate() -> Result<()> {
        let states = states()?;
        let current = states.properties(69, 0);
        match states.change("lever", 69, &current, &properties([("facing", "north")])) {
            Err(Error::NoMatchingLegacyState { last_found, .. }) => {
                assert_eq!(
                    last_found,
                    Some(properties([("facing", "west"), ("powered", "true")]))
                );
            }
            other => panic!("expected a legacy state error, got {other:?}"),
        }
        Ok(())
    }
}
