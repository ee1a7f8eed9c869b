use std::fmt;

use serde::{Deserialize, Serialize};

/// Every view type the workspace can instantiate.
///
/// The per-type behavior lives in [`crate::views`]; this enum is the single
/// dispatch point for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewType {
    #[serde(rename = "scatter")]
    Scatter,
    #[serde(rename = "scatter3D")]
    Scatter3D,
    #[serde(rename = "periodictable")]
    PeriodicTable,
    #[serde(rename = "regression")]
    Regression,
    #[serde(rename = "onehot")]
    OneHot,
    #[serde(rename = "xenonpy")]
    Xenonpy,
}

impl ViewType {
    pub const ALL: [ViewType; 6] = [
        ViewType::Scatter,
        ViewType::Scatter3D,
        ViewType::PeriodicTable,
        ViewType::Regression,
        ViewType::OneHot,
        ViewType::Xenonpy,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Scatter => "scatter",
            Self::Scatter3D => "scatter3D",
            Self::PeriodicTable => "periodictable",
            Self::Regression => "regression",
            Self::OneHot => "onehot",
            Self::Xenonpy => "xenonpy",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
