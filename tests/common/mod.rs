// Shared fakes and fixtures for balancer integration tests.

use async_trait::async_trait;
use basalt::cluster::{Balancer, ClusterView, CostAnalyzer, RuntimeParams, ServerHolder};
use basalt::config::BalancerConfig;
use basalt::coordinator::{Coordinator, MoveCallback, MoveOutcome, Peon};
use basalt::error::{BasaltError, Result};
use basalt::types::{Segment, SegmentId, SegmentInterval, Server, ShardSpec};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Peon fake backed by an in-memory load queue.
#[derive(Default)]
pub struct FakePeon {
    queued: Mutex<HashMap<SegmentId, u64>>,
}

impl FakePeon {
    pub fn enqueue(&self, id: SegmentId, size_bytes: u64) {
        self.queued.lock().insert(id, size_bytes);
    }
}

impl Peon for FakePeon {
    fn load_queue_bytes(&self) -> u64 {
        self.queued.lock().values().sum()
    }

    fn queue_depth(&self) -> usize {
        self.queued.lock().len()
    }

    fn segments_to_load(&self) -> HashSet<SegmentId> {
        self.queued.lock().keys().cloned().collect()
    }
}

/// One issued move intent, as observed by the fake coordinator.
#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub from: String,
    pub to: String,
    pub segment: SegmentId,
    pub size_bytes: u64,
}

/// Coordinator fake that records issued moves and mirrors each one onto
/// the destination peon's load queue, the way the real executor would.
#[derive(Default)]
pub struct RecordingCoordinator {
    peons: Mutex<HashMap<String, Arc<FakePeon>>>,
    segment_sizes: Mutex<HashMap<SegmentId, u64>>,
    moves: Mutex<Vec<MoveRecord>>,
}

impl RecordingCoordinator {
    pub fn register_server(&self, name: &str, peon: Arc<FakePeon>) {
        self.peons.lock().insert(name.to_string(), peon);
    }

    pub fn register_segment(&self, segment: &Segment) {
        self.segment_sizes
            .lock()
            .insert(segment.id(), segment.size_bytes);
    }

    pub fn moves(&self) -> Vec<MoveRecord> {
        self.moves.lock().clone()
    }
}

#[async_trait]
impl Coordinator for RecordingCoordinator {
    async fn move_segment(
        &self,
        from: &str,
        to: &str,
        segment_id: &SegmentId,
        callback: MoveCallback,
    ) -> Result<()> {
        if from == to {
            return Err(BasaltError::PreconditionFailed(
                "source and destination must differ".into(),
            ));
        }
        let peons = self.peons.lock();
        if !peons.contains_key(from) {
            return Err(BasaltError::UnknownServer(from.to_string()));
        }
        let Some(dest_peon) = peons.get(to) else {
            return Err(BasaltError::UnknownServer(to.to_string()));
        };
        let Some(&size_bytes) = self.segment_sizes.lock().get(segment_id) else {
            return Err(BasaltError::UnknownSegment(segment_id.to_string()));
        };

        dest_peon.enqueue(segment_id.clone(), size_bytes);
        self.moves.lock().push(MoveRecord {
            from: from.to_string(),
            to: to.to_string(),
            segment: segment_id.clone(),
            size_bytes,
        });
        callback(MoveOutcome::Completed);
        Ok(())
    }
}

/// Reference time used by the scenarios: well after the data was written.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap()
}

/// An hour-long segment starting at the first of the given month in 2012.
pub fn monthly_segment(datasource: &str, month: u32, size_bytes: u64) -> Segment {
    let start = Utc.with_ymd_and_hms(2012, month, 1, 0, 0, 0).unwrap();
    Segment::new(
        datasource,
        SegmentInterval::new(start, start + chrono::Duration::hours(1)),
        Utc.with_ymd_and_hms(2012, 3, 1, 0, 0, 0).unwrap(),
        ShardSpec::None,
        size_bytes,
    )
}

/// The standard workload: four segments over two datasources, sized
/// 11/7/4/8, with intervals in January and February 2012.
pub fn scenario_segments() -> Vec<Segment> {
    vec![
        monthly_segment("events", 1, 11),
        monthly_segment("events", 2, 7),
        monthly_segment("metrics", 1, 4),
        monthly_segment("metrics", 2, 8),
    ]
}

/// A small single-tier cluster wired to a recording coordinator.
#[derive(Default)]
pub struct ClusterFixture {
    pub coordinator: Arc<RecordingCoordinator>,
    view: ClusterView,
    peons: HashMap<String, Arc<dyn Peon>>,
    segments: Vec<Segment>,
}

impl ClusterFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a server to the "normal" tier, hosting the given segments.
    pub fn add_server(&mut self, name: &str, capacity: u64, hosted: Vec<Segment>) -> Arc<FakePeon> {
        let peon = Arc::new(FakePeon::default());
        let mut server = Server::new(name, "normal", capacity);
        for segment in hosted {
            self.coordinator.register_segment(&segment);
            self.segments.push(segment.clone());
            server.add_segment(segment);
        }
        self.coordinator.register_server(name, peon.clone());
        self.view
            .add_server("normal", ServerHolder::new(Arc::new(server), peon.clone()));
        self.peons.insert(name.to_string(), peon.clone());
        peon
    }

    pub fn view(&self) -> &ClusterView {
        &self.view
    }

    pub fn params(&self, max_moves: usize) -> RuntimeParams {
        RuntimeParams::builder()
            .with_cluster(self.view.clone())
            .with_peons(self.peons.clone())
            .with_available_segments(self.segments.clone())
            .with_max_moves(max_moves)
            .build()
    }

    pub fn balancer(&self, config: BalancerConfig) -> Balancer {
        Balancer::new(
            self.coordinator.clone(),
            CostAnalyzer::new(config.cost.clone()),
            config,
        )
    }
}
