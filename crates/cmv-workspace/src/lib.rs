//! Service layer for the view workspace.
//!
//! Owns the live views and the shared dataset, validates settings
//! submissions, dispatches render requests to a compute backend and applies
//! only the newest result of each view.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod dialog;
pub mod error;
pub mod workspace;
pub mod wrapper;

pub use backend::{BackendMessage, ComputeBackend, InlineBackend, WorkerBackend};
pub use config::{ViewSpec, WorkspaceConfig, load_color_tags, load_dataset};
pub use coordinator::{RequestTicket, ResultOutcome, UpdateCoordinator};
pub use dialog::{
    CorrelationId, DialogBroker, DialogRequest, DialogResolution, ModelSaveFlow, OwnedModel,
    SaveStep,
};
pub use error::{WorkspaceError, WorkspaceResult};
pub use workspace::Workspace;
pub use wrapper::{RenderPayload, ViewWrapper};
