use core::fmt;
use serde::{Deserialize, Serialize};

/// Identifier of one view in the workspace.
///
/// Unique among the views currently alive; every consumer of computed data
/// (mapper, coordinator) joins on it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(u32);

impl ViewId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The id directly after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u32> for ViewId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({})", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a color tag in the external tag registry.
pub type ColorTagId = u32;

/// A color tag as supplied by the tag registry. Read-only for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTag {
    pub id: ColorTagId,
    pub color: String,
}

impl ColorTag {
    pub fn new(id: ColorTagId, color: impl Into<String>) -> Self {
        Self {
            id,
            color: color.into(),
        }
    }
}
