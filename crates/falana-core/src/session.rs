//! Client-side session state: which thread is shown, its transcript, and
//! whether a send is in flight.
//!
//! [`SessionState`] only changes through its transition methods. [`SessionStore`]
//! pairs it with a [`Backend`] and applies the error policies: reads fall back
//! to empty, a failed send becomes a [`Notice`].

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::Backend;
use crate::error::{BackendError, OrEmpty};
use crate::state::Message;
use crate::thread::ThreadId;

/// User-visible error line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    BackendUnavailable,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Notice::BackendUnavailable => "Backend not responding",
        }
    }
}

/// A send that has been applied optimistically but not yet answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub thread_id: ThreadId,
    pub text: String,
}

/// What [`SessionState::finish_send`] did with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The server transcript replaced the local one
    Delivered,
    /// The send failed; the optimistic message stays and a notice is shown
    Failed,
    /// The user switched threads while waiting; the response was dropped
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current_thread: Option<ThreadId>,
    messages: Vec<Message>,
    busy: bool,
    notice: Option<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_thread(&self) -> Option<&ThreadId> {
        self.current_thread.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// Show `id` with the given history (already defaulted to empty on failure)
    pub fn select_thread(&mut self, id: ThreadId, history: Vec<Message>) {
        self.current_thread = Some(id);
        self.messages = history;
        self.notice = None;
    }

    /// Start a new, empty thread with a locally minted id
    pub fn create_thread(&mut self) -> ThreadId {
        let id = loop {
            let candidate = ThreadId::generate();
            if self.current_thread.as_ref() != Some(&candidate) {
                break candidate;
            }
        };
        self.current_thread = Some(id.clone());
        self.messages.clear();
        self.notice = None;
        id
    }

    /// Optimistically append `text` and mark the session busy.
    ///
    /// Returns `None`, changing nothing, while another send is in flight,
    /// when no thread is selected, or when `text` is blank.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if self.busy || text.trim().is_empty() {
            return None;
        }
        let thread_id = self.current_thread.clone()?;

        self.messages.push(Message::human(text));
        self.busy = true;
        self.notice = None;

        Some(PendingSend {
            thread_id,
            text: text.to_string(),
        })
    }

    /// Apply the backend's answer to an earlier [`begin_send`](Self::begin_send).
    ///
    /// Always clears `busy`.
    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        result: Result<Vec<Message>, BackendError>,
    ) -> SendOutcome {
        self.busy = false;

        if self.current_thread.as_ref() != Some(&pending.thread_id) {
            return SendOutcome::Stale;
        }

        match result {
            Ok(transcript) => {
                self.messages = transcript;
                SendOutcome::Delivered
            }
            Err(_) => {
                self.notice = Some(Notice::BackendUnavailable);
                SendOutcome::Failed
            }
        }
    }
}

/// A send running on its own task
pub struct InFlightSend {
    pending: PendingSend,
    task: JoinHandle<Result<Vec<Message>, BackendError>>,
}

impl InFlightSend {
    pub fn pending(&self) -> &PendingSend {
        &self.pending
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task. A panicked task counts as a failed send.
    pub async fn join(self) -> (PendingSend, Result<Vec<Message>, BackendError>) {
        let result = match self.task.await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "send task did not complete");
                Err(BackendError::Aborted)
            }
        };
        (self.pending, result)
    }
}

/// Session state bound to a backend
pub struct SessionStore {
    backend: Arc<dyn Backend>,
    state: SessionState,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Thread ids known to the backend; empty if it cannot be reached
    pub async fn list_threads(&self) -> Vec<ThreadId> {
        self.backend.list_threads().await.or_empty("list threads")
    }

    pub async fn select_thread(&mut self, id: ThreadId) {
        let history = self.backend.fetch_history(&id).await.or_empty("fetch history");
        debug!(thread = %id, messages = history.len(), "selected thread");
        self.state.select_thread(id, history);
    }

    pub fn create_thread(&mut self) -> ThreadId {
        let id = self.state.create_thread();
        info!(thread = %id, "created thread");
        id
    }

    /// Start sending `text` in the background.
    ///
    /// Returns `None` when [`SessionState::begin_send`] drops the call.
    pub fn dispatch_send(&mut self, text: &str) -> Option<InFlightSend> {
        let pending = self.state.begin_send(text)?;
        let backend = Arc::clone(&self.backend);
        let thread_id = pending.thread_id.clone();
        let message = pending.text.clone();

        let task = tokio::spawn(async move { backend.send_message(&thread_id, &message).await });
        Some(InFlightSend { pending, task })
    }

    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        result: Result<Vec<Message>, BackendError>,
    ) -> SendOutcome {
        if let Err(err) = &result {
            warn!(thread = %pending.thread_id, error = %err, "send failed");
        }
        let outcome = self.state.finish_send(pending, result);
        debug!(?outcome, "send finished");
        outcome
    }

    /// Send and wait for the answer in one step
    pub async fn append_and_send(&mut self, text: &str) -> Option<SendOutcome> {
        let in_flight = self.dispatch_send(text)?;
        let (pending, result) = in_flight.join().await;
        Some(self.finish_send(pending, result))
    }
}
