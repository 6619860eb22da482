//! `codec` translates between a flattened block's metadata offset and its named properties.
//!
//! The offset is a mixed-radix number, the last declared dimension is the least significant digit
//! and every earlier dimension weighs the product of the cardinalities declared after it.

use crate::{
    property::{Properties, PropertyValue},
    registry::{PropertyKind, StateDimension},
};

/// Encodes `values` into a metadata offset (add the type's `minStateId` to get a state id).
///
/// Properties that aren't a dimension of the block contribute nothing.
/// `None` when a value is so large the offset doesn't fit a `u32`.
pub fn encode(dimensions: &[StateDimension], values: &Properties) -> Option<u32> {
    values.iter().try_fold(0u32, |offset, (name, value)| {
        offset.checked_add(state_value(dimensions, name, value)?)
    })
}

/// Contribution of a single property to the metadata offset, `None` on overflow
pub fn state_value(dimensions: &[StateDimension], name: &str, value: &PropertyValue) -> Option<u32> {
    let mut weight = 1u32;
    for dimension in dimensions.iter().rev() {
        if dimension.name == name {
            return weight.checked_mul(parse_value(dimension, value)?);
        }
        weight = weight.checked_mul(dimension.num_values)?;
    }
    Some(0)
}

/// Decodes a metadata offset back into named properties
pub fn decode(dimensions: &[StateDimension], metadata: u32) -> Properties {
    let mut data = metadata;
    let mut properties = Properties::new();
    for dimension in dimensions.iter().rev() {
        let radix = dimension.num_values.max(1);
        properties.insert(dimension.name.clone(), digit_value(dimension, data % radix));
        data /= radix;
    }
    properties
}

/// `None` for integers outside of `u32`
fn parse_value(dimension: &StateDimension, value: &PropertyValue) -> Option<u32> {
    let digit = match dimension.kind {
        PropertyKind::Enum | PropertyKind::Other => index_of(dimension, value),
        // true is digit 0, false is digit 1
        PropertyKind::Bool => match value.as_bool() {
            Some(true) => 0,
            Some(false) => 1,
            None => index_of(dimension, value),
        },
        PropertyKind::Int => match value {
            PropertyValue::Int(i) => u32::try_from(*i).ok()?,
            PropertyValue::Str(s) => match s.parse::<i64>() {
                Ok(i) => u32::try_from(i).ok()?,
                Err(_) => 0,
            },
            PropertyValue::Bool(_) => index_of(dimension, value),
        },
    };
    Some(digit)
}

/// Ints come back as the positional digit, not the in-game value.
/// A pc `candles` dimension listing `1..=4` decodes a single candle as `0`.
fn digit_value(dimension: &StateDimension, digit: u32) -> PropertyValue {
    match dimension.kind {
        PropertyKind::Bool => PropertyValue::Bool(digit == 0),
        PropertyKind::Int => PropertyValue::Int(digit as i64),
        PropertyKind::Enum | PropertyKind::Other => match dimension.values.get(digit as usize) {
            Some(value) => PropertyValue::Str(value.clone()),
            None => PropertyValue::Int(digit as i64),
        },
    }
}

/// Position of `value` in the dimension's value list, 0 when it isn't listed
fn index_of(dimension: &StateDimension, value: &PropertyValue) -> u32 {
    let value = value.to_string();
    dimension
        .values
        .iter()
        .position(|v| *v == value)
        .unwrap_or(0) as u32
}
