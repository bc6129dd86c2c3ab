//! Admission gate limiting in-flight operations of one class

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting admission gate
///
/// At most `limit` holders are active at once; further `acquire` calls wait
/// in FIFO order. The gate knows nothing about what it guards, so one is
/// created per operation class and classes never contend with each other.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    /// Operation class name, used in log output
    class: &'static str,

    /// Maximum simultaneous holders
    limit: usize,

    semaphore: Arc<Semaphore>,
}

/// Slot held in an [`AdmissionGate`]; released on drop
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Creates a gate admitting `limit` holders (a zero limit is raised to one)
    pub fn new(class: &'static str, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            class,
            limit,
            semaphore: Arc::new(Semaphore::new(limit)),
        }
    }

    pub fn class(&self) -> &'static str {
        self.class
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of holders currently admitted
    pub fn active(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }

    /// Waits until fewer than `limit` holders are active, then admits the caller
    pub async fn acquire(&self) -> GatePermit {
        // The semaphore is private to the gate and never closed
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("admission gate semaphore closed");

        tracing::trace!(
            "Gate '{}' admitted holder ({}/{})",
            self.class,
            self.active(),
            self.limit
        );

        GatePermit { _permit: permit }
    }

    /// Runs `operation` while holding a slot
    ///
    /// The slot is released when the operation finishes, whether it returned
    /// an error, panicked, or was dropped mid-flight.
    pub async fn run<F>(&self, operation: F) -> F::Output
    where
        F: Future,
    {
        let _permit = self.acquire().await;
        operation.await
    }
}
