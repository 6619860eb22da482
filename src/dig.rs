//! `dig` computes how long a [`Block`] takes to break.
//!
//! Follows the vanilla breaking speed calculation, see <https://minecraft.wiki/w/Breaking#Calculation>

use crate::block::Block;
use ahash::AHashMap;

/// Milliseconds per game tick
const TICK_MS: f64 = 50.0;

/// An enchantment on the held tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enchantment {
    /// Matched by substring, so both `efficiency` and `minecraft:efficiency` work
    pub name: String,
    pub level: u32,
}

impl Enchantment {
    pub fn new(name: &str, level: u32) -> Self {
        Self {
            name: name.to_owned(),
            level,
        }
    }
}

/// An active status effect, the effect level is `amplifier + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effect {
    pub amplifier: u32,
    pub duration: u32,
}

/// Active effects keyed by registry effect id
pub type Effects = AHashMap<u32, Effect>;

/// What's going on around the player while digging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigConditions {
    pub creative: bool,
    pub in_water: bool,
    pub not_on_ground: bool,
}

impl Block {
    /// If the held item harvests this block, blocks without a tool restriction are harvestable by anything
    pub fn can_harvest(&self, held_item: Option<u32>) -> bool {
        match (&self.harvest_tools, held_item) {
            (None, _) => true,
            (Some(tools), Some(item)) => tools.contains(item as usize),
            (Some(_), None) => false,
        }
    }

    /// Time in milliseconds to break this block, always `0`, a multiple of 50 or [`f64::INFINITY`].
    ///
    /// ## Example
    /// ```no_run
    /// let iron_pickaxe = blocks.registry().item_by_name("iron_pickaxe").map(|i| i.id);
    /// let time = ore.dig_time(iron_pickaxe, DigConditions::default(), &[Enchantment::new("efficiency", 2)], &Effects::new());
    /// assert_eq!(time, 450.0);
    /// ```
    pub fn dig_time(
        &self,
        held_item: Option<u32>,
        conditions: DigConditions,
        enchantments: &[Enchantment],
        effects: &Effects,
    ) -> f64 {
        if conditions.creative {
            return 0.0;
        }

        let registry = self.factory().registry();
        let enchantment_level = |name: &str| -> u32 {
            if registry.enchantment_by_name(name).is_none() {
                return 0;
            }
            enchantments
                .iter()
                .find(|e| e.name.contains(name))
                .map_or(0, |e| e.level)
        };
        let effect_level = |name: &str| -> u32 {
            registry
                .effect_by_name(name)
                .and_then(|effect| effects.get(&effect.id))
                .map_or(0, |e| e.amplifier.saturating_add(1))
        };

        let mut speed = held_item
            .zip(self.material.as_deref())
            .and_then(|(item, material)| registry.material(material)?.get(&item).copied())
            .filter(|multiplier| *multiplier != 0.0)
            .unwrap_or(1.0);

        let efficiency = enchantment_level("efficiency");
        if efficiency > 0 && speed > 1.0 {
            speed += f64::from(efficiency).powi(2) + 1.0;
        }

        let haste = effect_level("Haste").max(effect_level("ConduitPower"));
        if haste > 0 {
            speed *= 1.0 + 0.2 * f64::from(haste);
        }

        let fatigue = effect_level("MiningFatigue");
        if fatigue > 0 {
            speed *= mining_fatigue_multiplier(fatigue);
        }

        if conditions.in_water && enchantment_level("aqua_affinity") == 0 {
            speed /= 5.0;
        }

        if conditions.not_on_ground {
            speed /= 5.0;
        }

        let tool_divisor = if self.can_harvest(held_item) { 30.0 } else { 100.0 };
        let mut delta = speed / self.hardness / tool_divisor;

        if self.hardness == -1.0 {
            delta = 0.0;
        }

        if delta == 0.0 {
            return f64::INFINITY;
        }

        if delta >= 1.0 {
            return 0.0;
        }

        (1.0 / delta).ceil() * TICK_MS
    }
}

fn mining_fatigue_multiplier(level: u32) -> f64 {
    match level {
        0 => 1.0,
        1 => 0.3,
        2 => 0.09,
        3 => 0.0027,
        _ => 8.1e-4,
    }
}
