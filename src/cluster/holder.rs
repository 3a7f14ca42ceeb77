//! Server snapshot paired with its pending-operations view.

use crate::coordinator::Peon;
use crate::types::{Segment, SegmentId, Server};
use std::fmt;
use std::sync::Arc;

/// A [`Server`] snapshot together with its peon, as seen during one cycle.
#[derive(Clone)]
pub struct ServerHolder {
    server: Arc<Server>,
    peon: Arc<dyn Peon>,
}

impl ServerHolder {
    pub fn new(server: Arc<Server>, peon: Arc<dyn Peon>) -> Self {
        Self { server, peon }
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn peon(&self) -> &Arc<dyn Peon> {
        &self.peon
    }

    /// Capacity left after current usage and loads already queued on the
    /// peon. Signed: queued loads may transiently overshoot the snapshot.
    ///
    /// A candidate destination must satisfy
    /// `available_size() >= segment.size_bytes` before a move is admitted.
    pub fn available_size(&self) -> i64 {
        self.server.max_size_bytes as i64
            - self.server.curr_size_bytes as i64
            - self.peon.load_queue_bytes() as i64
    }

    pub fn percent_used(&self) -> f64 {
        self.server.percent_used()
    }

    /// Whether the segment is resident or already queued to load here.
    /// Used to reject redundant moves.
    pub fn is_loading_or_hosting(&self, id: &SegmentId) -> bool {
        self.server.hosts(id) || self.peon.segments_to_load().contains(id)
    }

    /// Resident segments, excluding `excluded` when provided.
    pub fn residents_except(&self, excluded: Option<&SegmentId>) -> Vec<Segment> {
        self.server
            .segments
            .iter()
            .filter(|&(id, _)| Some(id) != excluded)
            .map(|(_, seg)| seg.clone())
            .collect()
    }
}

impl fmt::Debug for ServerHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHolder")
            .field("server", &self.server.name)
            .field("tier", &self.server.tier)
            .field("percent_used", &self.percent_used())
            .finish()
    }
}
