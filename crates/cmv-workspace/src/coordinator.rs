//! Request sequencing: only the newest request of a view may write its slot.

use std::collections::BTreeMap;

use cmv_core::{ComputedData, Dataset, ViewId, ViewSlot};
use cmv_views::RenderRequest;
use serde::Serialize;

use crate::backend::ComputeBackend;
use crate::error::WorkspaceResult;

/// Identifies one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTicket {
    pub view_id: ViewId,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultOutcome {
    /// The result was written to the view's slot.
    Applied,
    /// A newer request exists, or the view is gone. Nothing was written.
    Stale,
    /// The backend reported an error for the newest request.
    Failed { message: String },
}

#[derive(Debug, Default)]
pub struct UpdateCoordinator {
    next_seq: u64,
    latest: BTreeMap<ViewId, u64>,
}

impl UpdateCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the request to the backend and record its ticket.
    ///
    /// Any earlier ticket of the same view becomes stale. When the backend
    /// rejects the request nothing is recorded and earlier tickets stay live.
    pub fn send_update(
        &mut self,
        request: RenderRequest,
        backend: &mut dyn ComputeBackend,
    ) -> WorkspaceResult<RequestTicket> {
        let ticket = RequestTicket {
            view_id: request.view_id,
            seq: self.next_seq + 1,
        };
        let view_type = request.view_type;
        backend.submit(ticket, request)?;

        self.next_seq = ticket.seq;
        self.latest.insert(ticket.view_id, ticket.seq);
        tracing::info!(
            view_id = %ticket.view_id,
            seq = ticket.seq,
            %view_type,
            "dispatched view update"
        );
        Ok(ticket)
    }

    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.latest.get(&ticket.view_id) == Some(&ticket.seq)
    }

    /// Whether the view still waits on a result.
    pub fn is_pending(&self, view_id: ViewId) -> bool {
        self.latest.contains_key(&view_id)
    }

    pub fn pending_count(&self) -> usize {
        self.latest.len()
    }

    /// Apply a backend result if its ticket is still the newest one.
    pub fn on_result(
        &mut self,
        ticket: RequestTicket,
        result: Result<ComputedData, String>,
        dataset: &mut Dataset,
    ) -> ResultOutcome {
        if !self.is_latest(ticket) {
            tracing::debug!(view_id = %ticket.view_id, seq = ticket.seq, "discarding stale result");
            return ResultOutcome::Stale;
        }
        self.latest.remove(&ticket.view_id);
        match result {
            Ok(data) => {
                dataset.set_slot(ticket.view_id, ViewSlot::Computed(data));
                tracing::info!(view_id = %ticket.view_id, seq = ticket.seq, "applied view result");
                ResultOutcome::Applied
            }
            Err(message) => {
                tracing::warn!(
                    view_id = %ticket.view_id,
                    seq = ticket.seq,
                    %message,
                    "view update failed"
                );
                ResultOutcome::Failed { message }
            }
        }
    }

    /// Drop the view's outstanding ticket; its results will be stale.
    pub fn forget(&mut self, view_id: ViewId) {
        self.latest.remove(&view_id);
    }
}
