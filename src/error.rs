//! `error` contains the [`Error`] type for this crate and a shorthand [`Result`] type.

use crate::{config::StateEncoding, property::Properties};

pub type Result<T> = std::result::Result<T, Error>;

/// Show the [`std::fmt::Display`] of the error to display even further context & info
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Simdnbt(#[from] simdnbt::Error),

    #[error("No matching block id found for {block} with properties {properties:?}")]
    NoMatchingBlock {
        block: String,
        properties: Properties,
    },
    #[error("No matching block state found for {name} with properties {properties:?}")]
    NoMatchingState { name: String, properties: Properties },
    #[error(
        "No matching block state found for {name} with properties {properties:?} last found state: {last_found:?}"
    )]
    NoMatchingLegacyState {
        name: String,
        properties: Properties,
        last_found: Option<Properties>,
    },
    #[error("Changing block properties is not implemented for {0:?} block states")]
    NotImplemented(StateEncoding),
    #[error("Invalid block string '{0}'")]
    InvalidBlockString(String),
    #[error("Block '{0}' has no block entity extension for this operation")]
    NoExtension(String),
    #[error("Block '{0}' has no block entity data")]
    MissingBlockEntity(String),
    #[error("Nbt value at '{0}' was the wrong nbt data type")]
    InvalidNbtType(&'static str),
}
