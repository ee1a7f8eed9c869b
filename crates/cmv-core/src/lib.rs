//! cmv-core: shared foundation for the CMV view workspace.
//!
//! Contains:
//! - ids (view ids and color tag ids)
//! - dataset (shared main table + per-view computed slots)
//! - numeric (lenient value coercion + ordering helpers)
//! - error (shared error types)

pub mod dataset;
pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use dataset::*;
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
