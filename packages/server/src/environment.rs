//! Per-call tenant environment resolution.
//!
//! Every inbound RPC carries (optionally) an environment tag in its
//! metadata selecting which logical dataset a lookup targets. The tag
//! is normalized into a closed enum here; nothing downstream compares
//! raw strings.

use std::fmt;

use tonic::metadata::MetadataMap;

/// Preferred metadata key for the environment tag.
pub const METADATA_KEY: &str = "env";
/// Legacy metadata key, consulted when [`METADATA_KEY`] is absent or empty.
pub const LEGACY_METADATA_KEY: &str = "x-environment";

/// Logical dataset a lookup targets. Derived per call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    Prod,
    Master,
    #[default]
    Demo,
}

impl Environment {
    /// Normalizes a raw tag value.
    ///
    /// Only the exact strings `"prod"` and `"master"` pass through
    /// (case-sensitive); anything else resolves to [`Environment::Demo`].
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "prod" => Self::Prod,
            "master" => Self::Master,
            _ => Self::Demo,
        }
    }

    /// Resolves the environment from inbound call metadata.
    ///
    /// Lookup order: `env` first, then `x-environment` for legacy
    /// peers. Absent, empty, or unrecognized values resolve to
    /// [`Environment::Demo`]. Pure function of the metadata.
    #[must_use]
    pub fn from_metadata(metadata: &MetadataMap) -> Self {
        tag_value(metadata, METADATA_KEY)
            .or_else(|| tag_value(metadata, LEGACY_METADATA_KEY))
            .map_or(Self::Demo, Self::normalize)
    }

    /// Wire representation, echoed back in responses.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Master => "master",
            Self::Demo => "demo",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the metadata value for `key` if it is present, ASCII, and
/// non-empty.
fn tag_value<'a>(metadata: &'a MetadataMap, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}
