//! Settings records for every view type.
//!
//! Submitted form values arrive as loosely typed JSON; [`Settings::from_values`]
//! resolves them into the typed record for the view type. Numeric fields are
//! read leniently (text is parsed, garbage becomes zero) so a stray string
//! never turns into a type error downstream.

use cmv_core::{ColorTag, ColorTagId, Real, lenient_f64, lenient_u32};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{FieldError, ValidationError};
use crate::view_type::ViewType;
use crate::views::onehot::OneHotSettings;
use crate::views::periodic_table::PeriodicTableSettings;
use crate::views::regression::RegressionSettings;
use crate::views::scatter::ScatterSettings;
use crate::views::scatter3d::Scatter3DSettings;
use crate::views::xenonpy::XenonpySettings;

/// Plot size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    #[serde(default, deserialize_with = "lenient_real")]
    pub width: Real,
    #[serde(default, deserialize_with = "lenient_real")]
    pub height: Real,
}

impl Extent {
    pub const fn new(width: Real, height: Real) -> Self {
        Self { width, height }
    }

    /// Replace unset (non-positive) dimensions with `fallback`'s.
    pub fn fill_from(&mut self, fallback: Extent) {
        if self.width <= 0.0 {
            self.width = fallback.width;
        }
        if self.height <= 0.0 {
            self.height = fallback.height;
        }
    }
}

/// Options block of the views that only need a size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicOptions {
    #[serde(default)]
    pub extent: Extent,
}

/// Marker channel options of scatter views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    #[serde(default, deserialize_with = "lenient_real")]
    pub size: Real,
    /// Per-point marker sizes derived from the size mapping; empty when off.
    #[serde(default)]
    pub many_sizes: Vec<u32>,
}

/// Options block of the scatter views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotOptions {
    #[serde(default)]
    pub extent: Extent,
    #[serde(default)]
    pub axis_titles: Vec<String>,
    #[serde(default)]
    pub marker: Marker,
}

impl PlotOptions {
    /// Axis title `index`, if set to a non-blank column name.
    pub fn axis_title(&self, index: usize) -> Option<&str> {
        self.axis_titles
            .get(index)
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// Column bindings for derived visual channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default, deserialize_with = "non_blank")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub size: Option<String>,
}

/// The settings of one view, one variant per view type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Settings {
    Scatter(ScatterSettings),
    Scatter3D(Scatter3DSettings),
    PeriodicTable(PeriodicTableSettings),
    Regression(RegressionSettings),
    OneHot(OneHotSettings),
    Xenonpy(XenonpySettings),
}

impl Settings {
    /// Fresh settings for a newly created view.
    pub fn defaults(view_type: ViewType) -> Self {
        match view_type {
            ViewType::Scatter => Self::Scatter(ScatterSettings::default()),
            ViewType::Scatter3D => Self::Scatter3D(Scatter3DSettings::default()),
            ViewType::PeriodicTable => Self::PeriodicTable(PeriodicTableSettings::default()),
            ViewType::Regression => Self::Regression(RegressionSettings::default()),
            ViewType::OneHot => Self::OneHot(OneHotSettings::default()),
            ViewType::Xenonpy => Self::Xenonpy(XenonpySettings::default()),
        }
    }

    pub fn view_type(&self) -> ViewType {
        match self {
            Self::Scatter(_) => ViewType::Scatter,
            Self::Scatter3D(_) => ViewType::Scatter3D,
            Self::PeriodicTable(_) => ViewType::PeriodicTable,
            Self::Regression(_) => ViewType::Regression,
            Self::OneHot(_) => ViewType::OneHot,
            Self::Xenonpy(_) => ViewType::Xenonpy,
        }
    }

    /// Resolve submitted form values into typed settings.
    pub fn from_values(view_type: ViewType, values: Value) -> Result<Self, ValidationError> {
        fn parse<T: serde::de::DeserializeOwned>(
            view_type: ViewType,
            values: Value,
        ) -> Result<T, ValidationError> {
            serde_json::from_value(values).map_err(|e| {
                ValidationError::single(view_type, FieldError::invalid("settings", e.to_string()))
            })
        }

        let values = match values {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let mut settings = match view_type {
            ViewType::Scatter => Self::Scatter(parse(view_type, values)?),
            ViewType::Scatter3D => Self::Scatter3D(parse(view_type, values)?),
            ViewType::PeriodicTable => Self::PeriodicTable(parse(view_type, values)?),
            ViewType::Regression => Self::Regression(parse(view_type, values)?),
            ViewType::OneHot => Self::OneHot(parse(view_type, values)?),
            ViewType::Xenonpy => Self::Xenonpy(parse(view_type, values)?),
        };
        settings.ensure_defaults();
        Ok(settings)
    }

    /// Settings as the JSON record a form is initialised with.
    pub fn to_values(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Fill missing nested defaults. Idempotent; never rejects anything.
    pub fn ensure_defaults(&mut self) {
        match self {
            Self::Scatter(s) => s.ensure_defaults(),
            Self::Scatter3D(s) => s.ensure_defaults(),
            Self::PeriodicTable(s) => s.ensure_defaults(),
            Self::Regression(s) => s.ensure_defaults(),
            Self::OneHot(s) => s.ensure_defaults(),
            Self::Xenonpy(s) => s.ensure_defaults(),
        }
    }

    pub fn extent(&self) -> Extent {
        match self {
            Self::Scatter(s) => s.options.extent,
            Self::Scatter3D(s) => s.options.extent,
            Self::PeriodicTable(s) => s.options.extent,
            Self::Regression(s) => s.options.extent,
            Self::OneHot(s) => s.options.extent,
            Self::Xenonpy(s) => s.options.extent,
        }
    }

    /// Color-tag filter, for the view types that have one.
    pub fn filter(&self) -> Option<&[ColorTagId]> {
        match self {
            Self::Scatter(s) => Some(&s.filter),
            Self::Scatter3D(s) => Some(&s.filter),
            Self::Xenonpy(s) => Some(&s.filter),
            Self::PeriodicTable(_) | Self::Regression(_) | Self::OneHot(_) => None,
        }
    }

    fn filter_mut(&mut self) -> Option<&mut Vec<ColorTagId>> {
        match self {
            Self::Scatter(s) => Some(&mut s.filter),
            Self::Scatter3D(s) => Some(&mut s.filter),
            Self::Xenonpy(s) => Some(&mut s.filter),
            Self::PeriodicTable(_) | Self::Regression(_) | Self::OneHot(_) => None,
        }
    }

    /// Drop filter ids that no longer name a live color tag.
    pub fn prune_color_tags(&mut self, color_tags: &[ColorTag]) {
        if let Some(filter) = self.filter_mut() {
            filter.retain(|id| color_tags.iter().any(|t| t.id == *id));
        }
    }
}

pub(crate) fn lenient_real<'de, D>(deserializer: D) -> Result<Real, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_f64(value.as_ref()))
}

pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_u32(value.as_ref()))
}

/// Blank strings and nulls read as `None`.
pub(crate) fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extent_strings_are_coerced() {
        let settings = Settings::from_values(
            ViewType::OneHot,
            json!({"featureColumns": ["a"], "options": {"extent": {"width": "640", "height": "oops"}}}),
        )
        .unwrap();
        let extent = settings.extent();
        assert_eq!(extent.width, 640.0);
        // Unparsable height is zero, then refilled from the type default.
        assert!(extent.height > 0.0);
    }

    #[test]
    fn null_values_give_defaults() {
        let settings = Settings::from_values(ViewType::PeriodicTable, Value::Null).unwrap();
        assert_eq!(settings, {
            let mut d = Settings::defaults(ViewType::PeriodicTable);
            d.ensure_defaults();
            d
        });
    }

    #[test]
    fn ensure_defaults_is_idempotent() {
        for t in ViewType::ALL {
            let mut once = Settings::defaults(t);
            once.ensure_defaults();
            let mut twice = once.clone();
            twice.ensure_defaults();
            assert_eq!(once, twice, "{t}");
        }
    }

    #[test]
    fn values_round_trip_through_json() {
        for t in ViewType::ALL {
            let settings = Settings::from_values(t, Value::Null).unwrap();
            let back = Settings::from_values(t, settings.to_values()).unwrap();
            assert_eq!(settings, back, "{t}");
        }
    }

    #[test]
    fn unknown_method_is_a_validation_error() {
        let err =
            Settings::from_values(ViewType::Scatter3D, json!({"method": "tSNE"})).unwrap_err();
        assert!(err.has_field("settings"));
    }

    #[test]
    fn prune_drops_dead_tag_ids() {
        let mut settings =
            Settings::from_values(ViewType::Scatter, json!({"filter": [1, 2, 3]})).unwrap();
        settings.prune_color_tags(&[ColorTag::new(1, "red"), ColorTag::new(3, "blue")]);
        assert_eq!(settings.filter(), Some(&[1, 3][..]));
    }
}
