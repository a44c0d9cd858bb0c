//! Contract with the external Retrieval Service.
//!
//! The registry lookup, statement parsing, news scan and website scrape all
//! live behind [`RetrievalService`]; the dashboard only reacts to the resolved
//! payload. Timeout and cancellation are applied here, at the boundary.

mod mock;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::domain::{DashboardPayload, RetrievalRequest};

pub use mock::{demo_payload, MockRetrievalService};

#[async_trait]
pub trait RetrievalService: Send + Sync {
    async fn retrieve(&self, request: RetrievalRequest)
        -> Result<DashboardPayload, RetrievalError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalError {
    #[error("retrieval rejected: {0}")]
    Rejected(String),
    #[error("retrieval timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("retrieval cancelled")]
    Cancelled,
    #[error("retrieval service unavailable: {0}")]
    Unavailable(String),
}

/// Retrieval Service wrapped with the boundary timeout.
#[derive(Clone)]
pub struct RetrievalClient {
    service: Arc<dyn RetrievalService>,
    timeout: Duration,
}

impl RetrievalClient {
    pub fn new(service: Arc<dyn RetrievalService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn fetch(
        &self,
        request: RetrievalRequest,
    ) -> Result<DashboardPayload, RetrievalError> {
        match tokio::time::timeout(self.timeout, self.service.retrieve(request)).await {
            Ok(result) => result,
            Err(_) => Err(RetrievalError::TimedOut(self.timeout)),
        }
    }

    /// Runs the call on its own task and hands the outcome to `deliver`.
    pub fn spawn<F, Fut>(&self, request: RetrievalRequest, deliver: F) -> RetrievalTask
    where
        F: FnOnce(Result<DashboardPayload, RetrievalError>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let client = self.clone();
        let handle = tokio::spawn(async move {
            let outcome = client.fetch(request).await;
            deliver(outcome).await;
        });
        RetrievalTask { handle }
    }
}

impl std::fmt::Debug for RetrievalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Handle to an in-flight retrieval.
#[derive(Debug)]
pub struct RetrievalTask {
    handle: JoinHandle<()>,
}

impl RetrievalTask {
    /// Aborts the call; its outcome is never delivered.
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
