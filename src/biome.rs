//! `biome` contains the [`Biome`] value every [`Block`](crate::Block) carries a copy of.

use crate::registry::Registry;

/// A biome as seen from a single block.
///
/// Unknown ids still give a [`Biome`], just with only the `id` filled in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Biome {
    pub id: u32,
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub temperature: f32,
    pub rainfall: f32,
    pub dimension: String,
}

impl Biome {
    /// Resolves a biome from its numeric id.
    ///
    /// ## Example
    /// ```no_run
    /// let plains = Biome::new(&registry, 1);
    /// assert_eq!(plains.name, "plains");
    /// ```
    pub fn new(registry: &Registry, id: u32) -> Self {
        match registry.biome(id) {
            Some(biome) => Biome {
                id,
                name: biome.name.clone(),
                display_name: biome.display_name.clone(),
                category: biome.category.clone(),
                temperature: biome.temperature,
                rainfall: biome.rainfall,
                dimension: biome.dimension.clone(),
            },
            None => Biome {
                id,
                ..Default::default()
            },
        }
    }

    pub fn is_known(&self) -> bool {
        !self.name.is_empty()
    }
}
