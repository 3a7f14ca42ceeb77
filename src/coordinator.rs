//! Collaborator interfaces consumed by the balancing core.
//!
//! The core reaches the rest of the control plane through two narrow
//! traits: [`Coordinator`] accepts asynchronous move intents, and [`Peon`]
//! exposes a server's pending-operations view for admission checks. Both
//! sides of segment execution live behind these traits; the balancer never
//! touches bytes or queues directly.

use crate::error::Result;
use crate::types::SegmentId;
use async_trait::async_trait;
use std::collections::HashSet;

/// Outcome of a move intent, delivered through [`MoveCallback`] once the
/// executing side settles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Completed,
    Failed(String),
}

/// Callback invoked when a move intent completes or fails. Delivery happens
/// outside the balancing cycle; the balancer never blocks on it.
pub type MoveCallback = Box<dyn FnOnce(MoveOutcome) + Send + 'static>;

/// Cluster-wide coordinator owning segment execution.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Enqueue an asynchronous segment move from `from` to `to`.
    ///
    /// Implementations must fail fast on malformed arguments (`from == to`,
    /// unknown server, unknown segment key) and must not block on transfer
    /// completion; all execution outcomes arrive later via `callback`. A
    /// lost intent is benign: the next cycle re-evaluates and may reissue.
    async fn move_segment(
        &self,
        from: &str,
        to: &str,
        segment_id: &SegmentId,
        callback: MoveCallback,
    ) -> Result<()>;
}

/// Read-only view of one server's load queue.
///
/// The peon is solely responsible for de-duplicating and validating
/// instructions before acting, so a stale read here degrades to a no-op on
/// the peon side, never a correctness violation.
pub trait Peon: Send + Sync {
    /// Bytes of segments already queued to load on this server.
    fn load_queue_bytes(&self) -> u64;

    /// Number of pending operations, used to bound in-flight churn.
    fn queue_depth(&self) -> usize;

    /// Keys of segments queued to load.
    fn segments_to_load(&self) -> HashSet<SegmentId>;
}
