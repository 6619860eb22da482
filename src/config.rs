//! `config` holds the data format context that decides how state ids are read and whether block hashes exist.

use serde::Deserialize;

/// Which game edition a registry was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Pc,
    Bedrock,
}

/// How a numeric state id maps onto a block type and its properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEncoding {
    /// One global id per block configuration, properties are a mixed-radix offset from `minStateId`.
    Flattened,
    /// Pre-flattening `(id << 4) | metadata`, properties come from the legacy catalog.
    Legacy,
    /// Bedrock runtime ids, properties are listed per state id in the registry.
    Bedrock,
}

/// The `version` section of a registry document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub edition: Edition,
    pub minecraft_version: String,
    /// Feature flags, only `blockStateId` & `blockHashes` are read by this crate
    #[serde(default)]
    pub features: Vec<String>,
}

impl VersionInfo {
    pub fn supports_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Resolved data format for a registry.
///
/// Computed once when a [`BlockFactory`](crate::BlockFactory) is built, every call site just matches on [`StateEncoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub edition: Edition,
    pub encoding: StateEncoding,
    /// If blocks are identified by a hash of their name & properties on the wire
    pub block_hashes: bool,
}

impl Format {
    pub const BLOCK_STATE_ID: &'static str = "blockStateId";
    pub const BLOCK_HASHES: &'static str = "blockHashes";

    pub fn from_version(version: &VersionInfo) -> Self {
        let encoding = match version.edition {
            Edition::Bedrock => StateEncoding::Bedrock,
            Edition::Pc if version.supports_feature(Self::BLOCK_STATE_ID) => StateEncoding::Flattened,
            Edition::Pc => StateEncoding::Legacy,
        };

        Self {
            edition: version.edition,
            encoding,
            block_hashes: version.supports_feature(Self::BLOCK_HASHES),
        }
    }

    /// If the encoding uses one state id per configuration (anything post 1.13 or bedrock)
    pub fn uses_block_states(&self) -> bool {
        self.encoding != StateEncoding::Legacy
    }
}

impl Default for Format {
    fn default() -> Self {
        Self {
            edition: Edition::Pc,
            encoding: StateEncoding::Flattened,
            block_hashes: false,
        }
    }
}
