//! Composition root and retrieval state machine.

mod bindings;
mod view;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::components::ComponentRegistry;
use super::domain::{DashboardPayload, Report, RetrievalRequest};
use super::markup::Node;
use super::retrieval::RetrievalError;

pub use bindings::{Action, Binding, HandlerRegistry};
pub use view::{CANCEL_ID, RETRY_ID, SUBMIT_ID};
pub(crate) use view::{CANCEL_PATH, RETRIEVE_PATH, RETRY_PATH};

#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalState {
    Idle,
    Pending { generation: u64 },
    Loaded(Box<DashboardPayload>),
    Failed { message: String },
}

impl RetrievalState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending { .. } => "pending",
            Self::Loaded(_) => "loaded",
            Self::Failed { .. } => "failed",
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn payload(&self) -> Option<&DashboardPayload> {
        match self {
            Self::Loaded(payload) => Some(payload),
            _ => None,
        }
    }
}

/// A retrieval the caller must start on behalf of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalTicket {
    pub generation: u64,
    pub request: RetrievalRequest,
}

/// Side effect requested by an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartRetrieval(RetrievalTicket),
    CancelRetrieval { generation: u64 },
}

/// Owns the retrieval state, the form and the composed subtree.
#[derive(Debug)]
pub struct RootApp {
    components: ComponentRegistry,
    state: RetrievalState,
    form: RetrievalRequest,
    handlers: HandlerRegistry,
    next_generation: u64,
    tree: Node,
}

impl RootApp {
    /// Creates the app and performs the initial render.
    pub fn new(components: ComponentRegistry) -> Self {
        let mut app = Self {
            components,
            state: RetrievalState::Idle,
            form: RetrievalRequest::default(),
            handlers: HandlerRegistry::new(),
            next_generation: 1,
            tree: Node::Text(String::new()),
        };
        app.render();
        app
    }

    pub fn state(&self) -> &RetrievalState {
        &self.state
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    pub fn form(&self) -> &RetrievalRequest {
        &self.form
    }

    pub fn report(&self) -> Option<&Report> {
        self.state.payload().map(|payload| &payload.reporting)
    }

    pub fn submit_enabled(&self) -> bool {
        self.handlers.is_bound(Action::Submit)
    }

    /// Full HTML document for the current render pass.
    pub fn document(&self) -> String {
        view::render_document(&self.tree, self.state.is_pending())
    }

    /// Routes an interaction on `element_id` through the current bindings.
    ///
    /// Elements without a binding in this pass (a disabled submit while
    /// pending, a retry button that no longer exists) are inert.
    pub fn dispatch(
        &mut self,
        element_id: &str,
        input: Option<RetrievalRequest>,
    ) -> Option<Command> {
        let Some(action) = self.handlers.lookup(element_id) else {
            debug!(element_id, state = self.state.label(), "interaction on unbound element ignored");
            return None;
        };

        match action {
            Action::Submit => {
                let request = input.unwrap_or_else(|| self.form.clone());
                Some(Command::StartRetrieval(self.begin_retrieval(request)))
            }
            Action::Retry => {
                let request = self.form.clone();
                Some(Command::StartRetrieval(self.begin_retrieval(request)))
            }
            Action::Cancel => self
                .cancel()
                .map(|generation| Command::CancelRetrieval { generation }),
        }
    }

    /// Submit through the submit button.
    pub fn submit(&mut self, request: RetrievalRequest) -> Option<RetrievalTicket> {
        match self.dispatch(SUBMIT_ID, Some(request)) {
            Some(Command::StartRetrieval(ticket)) => Some(ticket),
            _ => None,
        }
    }

    fn begin_retrieval(&mut self, request: RetrievalRequest) -> RetrievalTicket {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.form = request.clone();
        self.transition(RetrievalState::Pending { generation });
        RetrievalTicket {
            generation,
            request,
        }
    }

    /// Applies a retrieval outcome; stale generations are ignored.
    pub fn resolve(
        &mut self,
        generation: u64,
        outcome: Result<DashboardPayload, RetrievalError>,
    ) -> bool {
        if self.in_flight() != Some(generation) {
            debug!(generation, state = self.state.label(), "stale retrieval outcome ignored");
            return false;
        }

        let next = match outcome {
            Ok(payload) => RetrievalState::Loaded(Box::new(payload)),
            Err(err) => {
                warn!(generation, error = %err, "retrieval failed");
                RetrievalState::Failed {
                    message: err.to_string(),
                }
            }
        };
        self.transition(next);
        true
    }

    /// Abandons the in-flight retrieval, returning its generation.
    pub fn cancel(&mut self) -> Option<u64> {
        let generation = self.in_flight()?;
        self.transition(RetrievalState::Failed {
            message: RetrievalError::Cancelled.to_string(),
        });
        Some(generation)
    }

    pub fn in_flight(&self) -> Option<u64> {
        match self.state {
            RetrievalState::Pending { generation } => Some(generation),
            _ => None,
        }
    }

    fn transition(&mut self, next: RetrievalState) {
        info!(
            from = self.state.label(),
            to = next.label(),
            generation = self.next_generation - 1,
            "retrieval state transition"
        );
        self.state = next;
        self.render();
    }

    /// Re-renders the current state; output and bindings depend on nothing else.
    pub(crate) fn render(&mut self) {
        self.handlers.begin_pass();
        self.tree = view::render_root(&self.state, &self.form, &self.components, &mut self.handlers);
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            state: self.state.label(),
            generation: self.in_flight(),
            submit_enabled: self.submit_enabled(),
            render_pass: self.handlers.pass(),
            bindings: self.handlers.bindings().to_vec(),
            error: match &self.state {
                RetrievalState::Failed { message } => Some(message.clone()),
                _ => None,
            },
            payload: self.state.payload().cloned(),
            html: self.document(),
        }
    }
}

/// Serializable view of the app after the latest render pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
    pub submit_enabled: bool,
    pub render_pass: u64,
    pub bindings: Vec<Binding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<DashboardPayload>,
    #[serde(skip)]
    pub html: String,
}
