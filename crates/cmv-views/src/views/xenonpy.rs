//! XenonPy descriptor view: builds a chemical composition per row from the
//! selected element columns and asks the backend for composition
//! descriptors.
//!
//! Three methods:
//! - `average`: each row's non-`None` element symbols joined as-is
//! - `weighted average`: symbols interleaved with coefficients 1-5
//! - `weighted from column`: metal symbols 1-5 interleaved with the row's
//!   values, which act as the weights

use cmv_core::{ColorTagId, MainData, Real};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldErrors, ValidationError};
use crate::form::{Condition, FieldKind, FormField};
use crate::settings::{BasicOptions, Extent, lenient_real};
use crate::transform::{RequestData, ordered_rows, selected_columns};
use crate::view_type::ViewType;

use super::{EXTENT_FIELDS, FEATURE_COLUMNS, first_column};

const DEFAULT_EXTENT: Extent = Extent::new(800.0, 400.0);

/// Placeholder of an unselected metal picker.
pub const NO_METAL: &str = "None";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum XenonpyMethod {
    #[default]
    #[serde(rename = "average")]
    Average,
    #[serde(rename = "weighted average")]
    WeightedAverage,
    #[serde(rename = "weighted from column")]
    WeightedFromColumn,
}

impl XenonpyMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::WeightedAverage => "weighted average",
            Self::WeightedFromColumn => "weighted from column",
        }
    }
}

const WEIGHTED: &[&str] = &["weighted average"];
const FROM_COLUMN: &[&str] = &["weighted from column"];

/// Element symbols offered by the metal pickers, `None` first.
pub const ELEMENT_SYMBOLS: [&str; 119] = [
    NO_METAL, "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P",
    "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga",
    "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag",
    "Cd", "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu",
    "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au",
    "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am",
    "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg",
    "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

const fn coefficient(name: &'static str, label: &'static str, required: bool) -> FormField {
    let field =
        FormField::new(name, label, FieldKind::Number).visible(Condition::MethodIn(WEIGHTED));
    if required {
        field.required(Condition::MethodIn(WEIGHTED))
    } else {
        field
    }
}

const METAL_KIND: FieldKind = FieldKind::Choice(&ELEMENT_SYMBOLS);

const fn metal(name: &'static str, label: &'static str, required: bool) -> FormField {
    let field = FormField::new(name, label, METAL_KIND)
        .visible(Condition::MethodIn(FROM_COLUMN));
    if required {
        field.required(Condition::MethodIn(FROM_COLUMN))
    } else {
        field
    }
}

pub(crate) static FORM: [FormField; 15] = [
    FormField::new("filter", "Filter", FieldKind::ColorTags),
    FormField::new(
        "method",
        "Method",
        FieldKind::Choice(&["average", "weighted average", "weighted from column"]),
    ),
    FEATURE_COLUMNS,
    coefficient("coefficient1", "Coefficient 1", true),
    coefficient("coefficient2", "Coefficient 2", false),
    coefficient("coefficient3", "Coefficient 3", false),
    coefficient("coefficient4", "Coefficient 4", false),
    coefficient("coefficient5", "Coefficient 5", false),
    metal("metal1", "Metal 1", true),
    metal("metal2", "Metal 2", false),
    metal("metal3", "Metal 3", false),
    metal("metal4", "Metal 4", false),
    metal("metal5", "Metal 5", false),
    EXTENT_FIELDS[0],
    EXTENT_FIELDS[1],
];

fn no_metal() -> String {
    NO_METAL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XenonpySettings {
    #[serde(default)]
    pub method: XenonpyMethod,
    #[serde(default)]
    pub filter: Vec<ColorTagId>,
    #[serde(default)]
    pub feature_columns: Vec<String>,
    #[serde(default, deserialize_with = "lenient_real")]
    pub coefficient1: Real,
    #[serde(default, deserialize_with = "lenient_real")]
    pub coefficient2: Real,
    #[serde(default, deserialize_with = "lenient_real")]
    pub coefficient3: Real,
    #[serde(default, deserialize_with = "lenient_real")]
    pub coefficient4: Real,
    #[serde(default, deserialize_with = "lenient_real")]
    pub coefficient5: Real,
    #[serde(default = "no_metal")]
    pub metal1: String,
    #[serde(default = "no_metal")]
    pub metal2: String,
    #[serde(default = "no_metal")]
    pub metal3: String,
    #[serde(default = "no_metal")]
    pub metal4: String,
    #[serde(default = "no_metal")]
    pub metal5: String,
    #[serde(default)]
    pub options: BasicOptions,
}

impl Default for XenonpySettings {
    fn default() -> Self {
        Self {
            method: XenonpyMethod::default(),
            filter: Vec::new(),
            feature_columns: Vec::new(),
            coefficient1: 0.0,
            coefficient2: 0.0,
            coefficient3: 0.0,
            coefficient4: 0.0,
            coefficient5: 0.0,
            metal1: no_metal(),
            metal2: no_metal(),
            metal3: no_metal(),
            metal4: no_metal(),
            metal5: no_metal(),
            options: BasicOptions::default(),
        }
    }
}

impl XenonpySettings {
    pub fn coefficients(&self) -> [Real; 5] {
        [
            self.coefficient1,
            self.coefficient2,
            self.coefficient3,
            self.coefficient4,
            self.coefficient5,
        ]
    }

    pub fn metals(&self) -> [&str; 5] {
        [
            self.metal1.as_str(),
            self.metal2.as_str(),
            self.metal3.as_str(),
            self.metal4.as_str(),
            self.metal5.as_str(),
        ]
    }

    pub(crate) fn ensure_defaults(&mut self) {
        self.options.extent.fill_from(DEFAULT_EXTENT);
        for metal in [
            &mut self.metal1,
            &mut self.metal2,
            &mut self.metal3,
            &mut self.metal4,
            &mut self.metal5,
        ] {
            if metal.trim().is_empty() {
                *metal = no_metal();
            }
        }
    }

    pub(crate) fn anchor_column(&self) -> Option<&str> {
        first_column(&self.feature_columns)
    }

    pub(crate) fn transform(&mut self, main: &MainData) -> Result<RequestData, ValidationError> {
        let mut errors = FieldErrors::new(ViewType::Xenonpy);
        errors.require("featureColumns", first_column(&self.feature_columns).is_some());
        for column in &self.feature_columns {
            if !main.schema.has_field(column) {
                errors.push(FieldError::invalid(
                    "featureColumns",
                    format!("Unknown column '{column}'"),
                ));
            }
        }
        match self.method {
            XenonpyMethod::Average => {}
            XenonpyMethod::WeightedAverage => {
                errors.require("coefficient1", self.coefficient1 != 0.0);
            }
            XenonpyMethod::WeightedFromColumn => {
                errors.require("metal1", self.metal1 != NO_METAL);
                for (i, metal) in self.metals().iter().enumerate() {
                    if !ELEMENT_SYMBOLS.contains(metal) {
                        errors.push(FieldError::invalid(
                            format!("metal{}", i + 1),
                            format!("'{metal}' is not an element symbol"),
                        ));
                    }
                }
            }
        }
        errors.finish()?;

        let rows = ordered_rows(main, None);
        Ok(selected_columns(
            &rows,
            self.feature_columns.iter().map(String::as_str),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmv_core::Schema;

    fn main() -> MainData {
        MainData::new(Vec::new(), Schema::from_names(["m1", "m2"]))
    }

    #[test]
    fn branch_fields_only_checked_for_their_method() {
        let mut s = XenonpySettings {
            feature_columns: vec!["m1".into()],
            ..XenonpySettings::default()
        };
        s.transform(&main()).unwrap();

        s.method = XenonpyMethod::WeightedAverage;
        assert!(s.transform(&main()).unwrap_err().has_field("coefficient1"));
        s.coefficient1 = 0.5;
        s.transform(&main()).unwrap();

        s.method = XenonpyMethod::WeightedFromColumn;
        assert!(s.transform(&main()).unwrap_err().has_field("metal1"));
        s.metal1 = "Pt".into();
        s.transform(&main()).unwrap();
    }

    #[test]
    fn bogus_metal_symbol_is_rejected() {
        let mut s = XenonpySettings {
            method: XenonpyMethod::WeightedFromColumn,
            feature_columns: vec!["m1".into()],
            metal1: "Pt".into(),
            metal3: "Xx".into(),
            ..XenonpySettings::default()
        };
        assert!(s.transform(&main()).unwrap_err().has_field("metal3"));
    }

    #[test]
    fn symbol_list_is_complete() {
        assert_eq!(ELEMENT_SYMBOLS.len(), 119);
        assert_eq!(ELEMENT_SYMBOLS[1], "H");
        assert_eq!(ELEMENT_SYMBOLS[118], "Og");
    }
}
