//! Error types for view creation and settings validation.

use std::fmt;

use thiserror::Error;

use cmv_core::ViewId;

use crate::view_type::ViewType;

pub type ViewResult<T> = Result<T, ViewError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewError {
    /// The factory was asked for a type the catalog does not list.
    #[error("Unknown view type: {type_tag}")]
    UnknownType { type_tag: String },

    /// Every id from `start_id` up to `u32::MAX` is taken.
    #[error("No free view id at or above {start_id}")]
    IdsExhausted { start_id: ViewId },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted field path, e.g. `options.axisTitles.0`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn required(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: "Required".to_string(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Settings that cannot be resolved into a transform input.
///
/// Carries every offending field so a form can show them inline; the
/// pipeline itself treats it as "not yet configured".
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Settings for {view_type} are incomplete: {}", join(.fields))]
pub struct ValidationError {
    pub view_type: ViewType,
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(view_type: ViewType, fields: Vec<FieldError>) -> Self {
        Self { view_type, fields }
    }

    pub fn single(view_type: ViewType, field: FieldError) -> Self {
        Self::new(view_type, vec![field])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.field == name)
    }
}

fn join(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects missing/invalid fields, then turns into a result in one go.
#[derive(Debug)]
pub(crate) struct FieldErrors {
    view_type: ViewType,
    fields: Vec<FieldError>,
}

impl FieldErrors {
    pub(crate) fn new(view_type: ViewType) -> Self {
        Self {
            view_type,
            fields: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.fields.push(error);
    }

    pub(crate) fn require(&mut self, field: &str, present: bool) {
        if !present {
            self.push(FieldError::required(field));
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.view_type, self.fields))
        }
    }
}
