//! cmv-views: view types, their settings forms, and the data-binding
//! pipeline that turns settings plus the shared dataset into render requests.
//!
//! Every per-type decision (defaults, form fields, transform, anchor
//! column) is reached through [`ViewType`]; callers never branch on the type
//! themselves.

pub mod catalog;
pub mod error;
pub mod factory;
pub mod form;
pub mod mapper;
pub mod settings;
pub mod transform;
pub mod view_type;
pub mod views;

pub use catalog::{
    MenuOption, ViewCategory, ViewTypeDescriptor, catalog, descriptor, find_by_tag, list_view_types,
    menu_options,
};
pub use error::{FieldError, ValidationError, ViewError, ViewResult};
pub use factory::{ViewInstance, ViewState, create_view, next_free_id, next_id};
pub use form::{Condition, FieldKind, FieldOption, FormField, SettingsForm};
pub use mapper::{MappedData, anchor_column, map_data};
pub use settings::Settings;
pub use transform::{RenderRequest, RequestData, transform};
pub use view_type::ViewType;
