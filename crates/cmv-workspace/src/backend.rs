//! Compute backends: a worker thread for real runs, an inline queue for tests.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cmv_core::ComputedData;
use cmv_views::RenderRequest;

use crate::coordinator::RequestTicket;
use crate::error::{WorkspaceError, WorkspaceResult};

/// The asynchronous compute/render service seam.
pub trait ComputeBackend {
    /// Queue a request. The result arrives later as a [`BackendMessage`].
    fn submit(&mut self, ticket: RequestTicket, request: RenderRequest) -> WorkspaceResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendMessage {
    Complete {
        ticket: RequestTicket,
        data: ComputedData,
    },
    Error {
        ticket: RequestTicket,
        message: String,
    },
}

impl BackendMessage {
    pub fn ticket(&self) -> RequestTicket {
        match self {
            Self::Complete { ticket, .. } | Self::Error { ticket, .. } => *ticket,
        }
    }

    pub fn into_result(self) -> (RequestTicket, Result<ComputedData, String>) {
        match self {
            Self::Complete { ticket, data } => (ticket, Ok(data)),
            Self::Error { ticket, message } => (ticket, Err(message)),
        }
    }

    fn compute(ticket: RequestTicket, request: &RenderRequest) -> Self {
        match cmv_compute::compute(request) {
            Ok(data) => Self::Complete { ticket, data },
            Err(e) => Self::Error {
                ticket,
                message: e.to_string(),
            },
        }
    }
}

type Job = (RequestTicket, RenderRequest);

/// Runs [`cmv_compute::compute`] on a background thread.
pub struct WorkerBackend {
    job_tx: Option<Sender<Job>>,
    result_rx: Receiver<BackendMessage>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerBackend {
    pub fn start() -> Self {
        let (job_tx, job_rx) = channel::<Job>();
        let (result_tx, result_rx) = channel();

        let handle = thread::spawn(move || {
            for (ticket, request) in job_rx {
                let message = BackendMessage::compute(ticket, &request);
                if result_tx.send(message).is_err() {
                    break;
                }
            }
        });

        Self {
            job_tx: Some(job_tx),
            result_rx,
            handle: Some(handle),
        }
    }

    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.result_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> WorkspaceResult<Option<BackendMessage>> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WorkspaceError::Backend {
                message: "compute worker stopped".to_string(),
            }),
        }
    }
}

impl ComputeBackend for WorkerBackend {
    fn submit(&mut self, ticket: RequestTicket, request: RenderRequest) -> WorkspaceResult<()> {
        let tx = self.job_tx.as_ref().ok_or_else(|| WorkspaceError::Backend {
            message: "compute worker stopped".to_string(),
        })?;
        tx.send((ticket, request)).map_err(|_| WorkspaceError::Backend {
            message: "compute worker stopped".to_string(),
        })
    }
}

impl Drop for WorkerBackend {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.job_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Holds submitted requests until the caller completes them, in any order.
#[derive(Debug, Default)]
pub struct InlineBackend {
    queue: VecDeque<Job>,
}

impl InlineBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn requests(&self) -> impl Iterator<Item = &RenderRequest> {
        self.queue.iter().map(|(_, r)| r)
    }

    /// Compute the oldest queued request.
    pub fn complete_next(&mut self) -> Option<BackendMessage> {
        self.queue
            .pop_front()
            .map(|(ticket, request)| BackendMessage::compute(ticket, &request))
    }

    /// Compute the newest queued request.
    pub fn complete_latest(&mut self) -> Option<BackendMessage> {
        self.queue
            .pop_back()
            .map(|(ticket, request)| BackendMessage::compute(ticket, &request))
    }

    /// Compute one specific request.
    pub fn complete(&mut self, ticket: RequestTicket) -> Option<BackendMessage> {
        let index = self.queue.iter().position(|(t, _)| *t == ticket)?;
        self.queue
            .remove(index)
            .map(|(ticket, request)| BackendMessage::compute(ticket, &request))
    }
}

impl ComputeBackend for InlineBackend {
    fn submit(&mut self, ticket: RequestTicket, request: RenderRequest) -> WorkspaceResult<()> {
        self.queue.push_back((ticket, request));
        Ok(())
    }
}
