//! Shared tabular dataset and the per-view computed data slots.
//!
//! `main` is read-only from the point of view of a single view; only the
//! data-loading side replaces it wholesale (bumping the version). Each view
//! owns exactly one slot, keyed by its id, written by the update
//! coordinator when a backend result is applied.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::ids::ViewId;

/// One record of the main table.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl Schema {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names
                .into_iter()
                .map(|n| SchemaField { name: n.into() })
                .collect(),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Column names must be non-blank and unique; every column lookup keys on them.
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen = BTreeSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(CoreError::BlankField { index });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// The shared main table: ordered rows plus the ordered column schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainData {
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default)]
    pub schema: Schema,
}

impl MainData {
    pub fn new(data: Vec<Row>, schema: Schema) -> Self {
        Self { data, schema }
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.schema.validate()
    }
}

/// Cells of `name` across `rows`, `Null` where a row lacks the key.
pub fn column_of(rows: &[Row], name: &str) -> Vec<Value> {
    rows.iter()
        .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Render-ready data produced by the compute backend for one view.
///
/// The shape is owned by the backend; the core only stores and forwards it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedData(Map<String, Value>);

impl ComputedData {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

const RESET_KEY: &str = "resetRequest";

/// Content of a view's slot: computed data, or the reset sentinel.
///
/// On the wire the sentinel is `{ "resetRequest": true }`; any other map is
/// computed data.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewSlot {
    ResetRequest,
    Computed(ComputedData),
}

impl ViewSlot {
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::ResetRequest)
    }
}

impl Serialize for ViewSlot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::ResetRequest => {
                let mut map = Map::new();
                map.insert(RESET_KEY.to_string(), Value::Bool(true));
                map.serialize(serializer)
            }
            Self::Computed(data) => data.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ViewSlot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        if map.len() == 1 && map.get(RESET_KEY) == Some(&Value::Bool(true)) {
            Ok(Self::ResetRequest)
        } else {
            Ok(Self::Computed(ComputedData::from_map(map)))
        }
    }
}

/// Monotonic counter identifying which `main` table is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetVersion(u64);

impl DatasetVersion {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub main: MainData,
    #[serde(default, rename = "views")]
    slots: BTreeMap<ViewId, ViewSlot>,
    #[serde(skip)]
    version: DatasetVersion,
    #[serde(skip)]
    revisions: BTreeMap<ViewId, u64>,
}

impl Dataset {
    pub fn new(main: MainData) -> Self {
        Self {
            main,
            ..Self::default()
        }
    }

    pub fn version(&self) -> DatasetVersion {
        self.version
    }

    /// Swap in a new main table. Existing view slots are kept; each view's
    /// mapper decides whether its slot still applies.
    pub fn replace_main(&mut self, main: MainData) {
        self.main = main;
        self.version = DatasetVersion(self.version.0 + 1);
    }

    pub fn slot(&self, id: ViewId) -> Option<&ViewSlot> {
        self.slots.get(&id)
    }

    /// Replace a view's slot wholesale.
    pub fn set_slot(&mut self, id: ViewId, slot: ViewSlot) {
        self.slots.insert(id, slot);
        *self.revisions.entry(id).or_insert(0) += 1;
    }

    pub fn clear_slot(&mut self, id: ViewId) -> Option<ViewSlot> {
        let removed = self.slots.remove(&id);
        if removed.is_some() {
            *self.revisions.entry(id).or_insert(0) += 1;
        }
        removed
    }

    /// Number of writes to the view's slot so far.
    pub fn slot_revision(&self, id: ViewId) -> u64 {
        self.revisions.get(&id).copied().unwrap_or(0)
    }
}
