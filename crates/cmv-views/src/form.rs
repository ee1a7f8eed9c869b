//! Declarative settings forms.
//!
//! Each view type declares its fields once; the form then derives which
//! fields are visible and which are required from the current values (the
//! active `method`, or a toggle), coerces numeric inputs, and validates.

use cmv_core::{ColorTag, Schema, parse_f64};
use serde_json::{Map, Value};

use crate::error::{FieldError, FieldErrors, ValidationError};
use crate::view_type::ViewType;
use crate::views;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One value out of a fixed list.
    Choice(&'static [&'static str]),
    /// One column of the main dataset.
    Column,
    /// Ordered selection of dataset columns.
    Columns,
    /// Selection of color-tag ids.
    ColorTags,
    Text,
    Number,
    Toggle,
}

/// When a field is shown, or when it must be filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Never,
    Always,
    /// Active while the form's `method` is one of these.
    MethodIn(&'static [&'static str]),
    /// Active while the named toggle field is on.
    Enabled(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    /// Dotted path into the settings record; numeric segments index arrays.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: Condition,
    pub visible: Condition,
}

impl FormField {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: Condition::Never,
            visible: Condition::Always,
        }
    }

    pub const fn required(mut self, when: Condition) -> Self {
        self.required = when;
        self
    }

    pub const fn visible(mut self, when: Condition) -> Self {
        self.visible = when;
        self
    }
}

/// A selectable option for dropdown-like fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub text: String,
    pub value: Value,
}

/// The settings form of one view type.
#[derive(Debug, Clone, Copy)]
pub struct SettingsForm {
    pub view_type: ViewType,
    pub fields: &'static [FormField],
    /// Method assumed when the values carry none.
    pub default_method: Option<&'static str>,
}

impl SettingsForm {
    pub fn for_type(view_type: ViewType) -> Self {
        views::form(view_type)
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The method the values select, falling back to the form default.
    pub fn active_method<'v>(&self, values: &'v Value) -> Option<&'v str> {
        match values.get("method").and_then(Value::as_str) {
            Some(m) if !m.is_empty() => Some(m),
            _ => self.default_method,
        }
    }

    fn holds(&self, condition: Condition, values: &Value) -> bool {
        match condition {
            Condition::Never => false,
            Condition::Always => true,
            Condition::MethodIn(methods) => self
                .active_method(values)
                .is_some_and(|m| methods.contains(&m)),
            Condition::Enabled(toggle) => lookup(values, toggle)
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// Fields shown for the current values, in declaration order.
    pub fn visible_fields(&self, values: &Value) -> Vec<&'static FormField> {
        self.fields
            .iter()
            .filter(|f| self.holds(f.visible, values))
            .collect()
    }

    /// Parse numeric fields submitted as text. Unparsable text is cleared.
    pub fn coerce(&self, values: &Value) -> Value {
        let mut out = match values {
            Value::Object(_) => values.clone(),
            _ => Value::Object(Map::new()),
        };
        for field in self.fields.iter().filter(|f| f.kind == FieldKind::Number) {
            let Some(Value::String(text)) = lookup(&out, field.name) else {
                continue;
            };
            let coerced = parse_f64(&Value::String(text.clone()))
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null);
            assign(&mut out, field.name, coerced);
        }
        out
    }

    /// Check the required fields of the active branch only.
    pub fn validate(&self, values: &Value) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new(self.view_type);
        for field in self.fields {
            let value = lookup(values, field.name);
            if self.holds(field.required, values) {
                errors.require(field.name, value.is_some_and(is_filled));
            }
            if let (FieldKind::Choice(choices), Some(Value::String(v))) = (field.kind, value) {
                if !v.is_empty() && !choices.contains(&v.as_str()) {
                    errors.push(FieldError::invalid(
                        field.name,
                        format!("'{v}' is not one of {}", choices.join(", ")),
                    ));
                }
            }
        }
        errors.finish()
    }

    /// Options for a dropdown-like field given the live columns and tags.
    pub fn options(
        &self,
        field: &FormField,
        schema: &Schema,
        color_tags: &[ColorTag],
    ) -> Vec<FieldOption> {
        match field.kind {
            FieldKind::Choice(choices) => choices
                .iter()
                .map(|c| FieldOption {
                    text: (*c).to_string(),
                    value: Value::String((*c).to_string()),
                })
                .collect(),
            FieldKind::Column | FieldKind::Columns => schema
                .field_names()
                .map(|n| FieldOption {
                    text: n.to_string(),
                    value: Value::String(n.to_string()),
                })
                .collect(),
            FieldKind::ColorTags => color_tags
                .iter()
                .map(|t| FieldOption {
                    text: t.color.clone(),
                    value: Value::from(t.id),
                })
                .collect(),
            FieldKind::Text | FieldKind::Number | FieldKind::Toggle => Vec::new(),
        }
    }
}

/// A value counts as filled unless it is null, blank text, an empty list,
/// or the `"None"` placeholder of symbol pickers.
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty() && s != "None",
        Value::Array(items) => items.first().is_some_and(is_filled),
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::Bool(_) | Value::Object(_) => true,
    }
}

/// Follow a dotted path; numeric segments index into arrays.
pub fn lookup<'v>(values: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(values, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn assign(values: &mut Value, path: &str, new_value: Value) {
    match path.split_once('.') {
        None => match values {
            Value::Object(map) => {
                map.insert(path.to_string(), new_value);
            }
            Value::Array(items) => {
                if let Some(slot) = path.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                    *slot = new_value;
                }
            }
            _ => {}
        },
        Some((head, rest)) => {
            let child = match values {
                Value::Object(map) => map.get_mut(head),
                Value::Array(items) => head.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
                _ => None,
            };
            if let Some(child) = child {
                assign(child, rest, new_value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let v = json!({"options": {"axisTitles": ["A", "B"]}});
        assert_eq!(lookup(&v, "options.axisTitles.1"), Some(&json!("B")));
        assert_eq!(lookup(&v, "options.axisTitles.2"), None);
        assert_eq!(lookup(&v, "options.extent.width"), None);
    }

    #[test]
    fn is_filled_rules() {
        assert!(!is_filled(&json!(null)));
        assert!(!is_filled(&json!("  ")));
        assert!(!is_filled(&json!("None")));
        assert!(!is_filled(&json!([])));
        assert!(!is_filled(&json!([""])));
        assert!(!is_filled(&json!(0)));
        assert!(is_filled(&json!(["a"])));
        assert!(is_filled(&json!(2.5)));
        assert!(is_filled(&json!(false)));
    }

    #[test]
    fn coerce_parses_number_fields_only() {
        let form = SettingsForm::for_type(ViewType::Regression);
        let values = json!({"folds": "4", "targetColumn": "7", "options": {"extent": {"width": "wide"}}});
        let coerced = form.coerce(&values);
        assert_eq!(coerced["folds"], json!(4.0));
        // Not a number field: left alone.
        assert_eq!(coerced["targetColumn"], json!("7"));
        assert_eq!(lookup(&coerced, "options.extent.width"), Some(&Value::Null));
    }

    #[test]
    fn required_fields_follow_the_active_method() {
        let form = SettingsForm::for_type(ViewType::Scatter3D);

        // Manual is the default branch: axis titles are required.
        let err = form.validate(&json!({})).unwrap_err();
        assert!(err.has_field("options.axisTitles.0"));
        assert!(!err.has_field("targetColumn"));

        // PCA branch: feature and target columns, axis titles no longer needed.
        let err = form.validate(&json!({"method": "PCA"})).unwrap_err();
        assert!(err.has_field("featureColumns"));
        assert!(err.has_field("targetColumn"));
        assert!(!err.has_field("options.axisTitles.0"));

        form.validate(&json!({"method": "PCA", "featureColumns": ["a"], "targetColumn": "t"}))
            .unwrap();
    }

    #[test]
    fn unknown_choice_is_rejected() {
        let form = SettingsForm::for_type(ViewType::Regression);
        let err = form
            .validate(&json!({"method": "Ridge", "featureColumns": ["a"], "targetColumn": "b"}))
            .unwrap_err();
        assert_eq!(err.fields.len(), 1);
        assert!(err.has_field("method"));
    }

    #[test]
    fn visibility_depends_on_method_and_toggles() {
        let form = SettingsForm::for_type(ViewType::Xenonpy);
        let names = |v: &Value| -> Vec<&str> {
            form.visible_fields(v).iter().map(|f| f.name).collect()
        };
        let avg = names(&json!({"method": "average"}));
        assert!(!avg.contains(&"coefficient1"));
        assert!(!avg.contains(&"metal1"));
        let weighted = names(&json!({"method": "weighted average"}));
        assert!(weighted.contains(&"coefficient5"));
        assert!(!weighted.contains(&"metal1"));

        let scatter = SettingsForm::for_type(ViewType::Scatter);
        let off: Vec<_> = scatter.visible_fields(&json!({})).iter().map(|f| f.name).collect();
        assert!(!off.contains(&"mappings.color"));
        let on: Vec<_> = scatter
            .visible_fields(&json!({"colorAssignmentEnabled": true}))
            .iter()
            .map(|f| f.name)
            .collect();
        assert!(on.contains(&"mappings.color"));
    }

    #[test]
    fn enabled_toggle_without_mapping_still_validates() {
        for view_type in [ViewType::Scatter, ViewType::Scatter3D] {
            let form = SettingsForm::for_type(view_type);
            let values = json!({
                "options": {"axisTitles": ["A", "B", "C"]},
                "colorAssignmentEnabled": true,
                "sizeAssignmentEnabled": true
            });
            assert!(form.validate(&values).is_ok(), "{view_type}");
        }
    }

    #[test]
    fn options_list_columns_and_tags() {
        let form = SettingsForm::for_type(ViewType::Scatter);
        let schema = Schema::from_names(["A", "B"]);
        let tags = [ColorTag::new(4, "red")];
        let filter = form.field("filter").unwrap();
        let opts = form.options(filter, &schema, &tags);
        assert_eq!(opts.len(), 1);
        assert_eq!(opts[0].value, json!(4));
        let x = form.field("options.axisTitles.0").unwrap();
        assert_eq!(form.options(x, &schema, &tags).len(), 2);
    }
}
