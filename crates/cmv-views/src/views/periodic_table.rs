//! Periodic table: a static chart of the elements. It reads nothing from the
//! dataset and has no required settings.

use serde::{Deserialize, Serialize};

use crate::form::FormField;
use crate::settings::{BasicOptions, Extent};
use crate::transform::RequestData;

use super::EXTENT_FIELDS;

const DEFAULT_EXTENT: Extent = Extent::new(1000.0, 450.0);

pub(crate) static FORM: [FormField; 2] = [EXTENT_FIELDS[0], EXTENT_FIELDS[1]];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodicTableSettings {
    #[serde(default)]
    pub options: BasicOptions,
}

impl PeriodicTableSettings {
    pub(crate) fn ensure_defaults(&mut self) {
        self.options.extent.fill_from(DEFAULT_EXTENT);
    }

    pub(crate) fn transform(&self) -> RequestData {
        RequestData::new()
    }
}
