//! Single-consumer event loop owning the [`RootApp`].
//!
//! User interactions and retrieval completions arrive on one queue and are
//! processed to completion, render pass included, before the next is taken.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::app::{Command, DashboardSnapshot, RootApp, CANCEL_ID, RETRY_ID, SUBMIT_ID};
use super::domain::{DashboardPayload, Report, RetrievalRequest};
use super::retrieval::{RetrievalClient, RetrievalError, RetrievalTask};

const QUEUE_DEPTH: usize = 64;

#[derive(Debug)]
enum DashboardEvent {
    Interaction {
        element_id: &'static str,
        input: Option<RetrievalRequest>,
        reply: oneshot::Sender<bool>,
    },
    Resolved {
        generation: u64,
        outcome: Result<DashboardPayload, RetrievalError>,
    },
    Snapshot {
        reply: oneshot::Sender<DashboardSnapshot>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("dashboard runtime is no longer running")]
    Closed,
}

/// Cloneable handle for talking to the running dashboard.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    events: mpsc::Sender<DashboardEvent>,
}

impl DashboardHandle {
    /// Presses the submit button; `false` when it was not bound (pending).
    pub async fn submit(&self, request: RetrievalRequest) -> Result<bool, RuntimeError> {
        self.interact(SUBMIT_ID, Some(request)).await
    }

    pub async fn retry(&self) -> Result<bool, RuntimeError> {
        self.interact(RETRY_ID, None).await
    }

    pub async fn cancel(&self) -> Result<bool, RuntimeError> {
        self.interact(CANCEL_ID, None).await
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.send(DashboardEvent::Snapshot { reply }).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    /// Report of the loaded payload, if any.
    pub async fn report(&self) -> Result<Option<Report>, RuntimeError> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot.payload.map(|payload| payload.reporting))
    }

    async fn interact(
        &self,
        element_id: &'static str,
        input: Option<RetrievalRequest>,
    ) -> Result<bool, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.send(DashboardEvent::Interaction {
            element_id,
            input,
            reply,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    async fn send(&self, event: DashboardEvent) -> Result<(), RuntimeError> {
        self.events
            .send(event)
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}

pub struct DashboardRuntime {
    app: RootApp,
    client: RetrievalClient,
    events: mpsc::WeakSender<DashboardEvent>,
    in_flight: Option<(u64, RetrievalTask)>,
}

impl DashboardRuntime {
    /// Moves `app` onto its own task and returns a handle to it.
    pub fn spawn(app: RootApp, client: RetrievalClient) -> (DashboardHandle, JoinHandle<()>) {
        let (events, queue) = mpsc::channel(QUEUE_DEPTH);
        let runtime = Self {
            app,
            client,
            events: events.downgrade(),
            in_flight: None,
        };
        let join = tokio::spawn(runtime.run(queue));
        (DashboardHandle { events }, join)
    }

    async fn run(mut self, mut queue: mpsc::Receiver<DashboardEvent>) {
        while let Some(event) = queue.recv().await {
            self.handle(event);
        }
        if let Some((_, task)) = self.in_flight.take() {
            task.cancel();
        }
    }

    fn handle(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Interaction {
                element_id,
                input,
                reply,
            } => {
                let handled = match self.app.dispatch(element_id, input) {
                    Some(command) => {
                        self.execute(command);
                        true
                    }
                    None => false,
                };
                let _ = reply.send(handled);
            }
            DashboardEvent::Resolved {
                generation,
                outcome,
            } => {
                if matches!(&self.in_flight, Some((current, _)) if *current == generation) {
                    self.in_flight = None;
                }
                self.app.resolve(generation, outcome);
            }
            DashboardEvent::Snapshot { reply } => {
                let _ = reply.send(self.app.snapshot());
            }
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::StartRetrieval(ticket) => {
                let generation = ticket.generation;
                let events = self.events.clone();
                let task = self.client.spawn(ticket.request, move |outcome| async move {
                    let delivered = match events.upgrade() {
                        Some(events) => events
                            .send(DashboardEvent::Resolved {
                                generation,
                                outcome,
                            })
                            .await
                            .is_ok(),
                        None => false,
                    };
                    if !delivered {
                        debug!(generation, "runtime stopped before retrieval resolved");
                    }
                });
                if let Some((previous, stale)) = self.in_flight.replace((generation, task)) {
                    debug!(previous, "aborting superseded retrieval");
                    stale.cancel();
                }
            }
            Command::CancelRetrieval { generation } => {
                if let Some((current, task)) = self.in_flight.take() {
                    if current == generation {
                        task.cancel();
                    } else {
                        self.in_flight = Some((current, task));
                    }
                }
            }
        }
    }
}
