//! Core type definitions for the Basalt balancing core.
//!
//! This module contains the entities the balancer reasons about: immutable
//! data [`Segment`]s, the [`Server`] snapshots that host them, and the
//! derived [`SegmentId`] identity.
//!
//! # Segment identity
//!
//! A segment's identity is a pure derivation from its coordinates: the
//! datasource name, the interval bounds, the version timestamp, and the
//! shard partition. Two segments with the same derived key are the same
//! logical unit. The key is never stored as mutable state.
//!
//! ```rust
//! use basalt::types::{Segment, SegmentInterval, ShardSpec};
//! use chrono::{TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
//! let segment = Segment::new(
//!     "events",
//!     SegmentInterval::new(start, start + chrono::Duration::hours(1)),
//!     Utc.with_ymd_and_hms(2012, 3, 1, 0, 0, 0).unwrap(),
//!     ShardSpec::None,
//!     11,
//! );
//! assert_eq!(
//!     segment.id().as_str(),
//!     "events_2012-01-01T00:00:00.000Z_2012-01-01T01:00:00.000Z_2012-03-01T00:00:00.000Z"
//! );
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name of a service tier. Servers belong to exactly one tier and moves
/// never cross tiers.
pub type TierName = String;

/// Name of a storage server.
pub type ServerName = String;

/// Canonical identity of a segment, derived from its coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open time range `[start, end)` covered by a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SegmentInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether the two intervals share any instant.
    pub fn overlaps(&self, other: &SegmentInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the two intervals touch without overlapping.
    pub fn abuts(&self, other: &SegmentInterval) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// Seconds separating the two intervals. Zero when they overlap or abut.
    pub fn gap_seconds(&self, other: &SegmentInterval) -> f64 {
        if self.overlaps(other) || self.abuts(other) {
            return 0.0;
        }
        let gap = if self.end <= other.start {
            other.start - self.end
        } else {
            self.start - other.end
        };
        gap.num_milliseconds() as f64 / 1000.0
    }
}

/// Partitioning of a datasource interval across sibling segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShardSpec {
    /// The interval is covered by a single segment.
    None,
    /// Linearly partitioned; partitions are independent.
    Linear { partition: u32 },
    /// Hash partitioned into a fixed number of buckets.
    Hashed { partition: u32, partitions: u32 },
}

impl ShardSpec {
    pub fn partition(&self) -> u32 {
        match self {
            ShardSpec::None => 0,
            ShardSpec::Linear { partition } => *partition,
            ShardSpec::Hashed { partition, .. } => *partition,
        }
    }
}

/// Immutable unit of columnar data for one datasource and time interval.
///
/// Segments are created by the ingestion subsystem and never mutated here;
/// the core only reads the authoritative set supplied each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub datasource: String,
    pub interval: SegmentInterval,
    pub version: DateTime<Utc>,
    pub shard: ShardSpec,
    pub size_bytes: u64,
}

impl Segment {
    pub fn new(
        datasource: impl Into<String>,
        interval: SegmentInterval,
        version: DateTime<Utc>,
        shard: ShardSpec,
        size_bytes: u64,
    ) -> Self {
        Self {
            datasource: datasource.into(),
            interval,
            version,
            shard,
            size_bytes,
        }
    }

    /// Derive the canonical key for this segment.
    ///
    /// Stable and collision free for the segment's lifetime: datasource,
    /// interval bounds, and version in millisecond RFC 3339, with the shard
    /// partition appended when nonzero.
    pub fn id(&self) -> SegmentId {
        let mut key = format!(
            "{}_{}_{}_{}",
            self.datasource,
            ts(self.interval.start),
            ts(self.interval.end),
            ts(self.version)
        );
        let partition = self.shard.partition();
        if partition > 0 {
            key.push('_');
            key.push_str(&partition.to_string());
        }
        SegmentId(key)
    }
}

fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Snapshot of a storage server as seen by the control plane.
///
/// The live descriptor is owned by the external coordinator; the balancer
/// reads one immutable snapshot per cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub name: ServerName,
    pub tier: TierName,
    pub curr_size_bytes: u64,
    pub max_size_bytes: u64,
    pub segments: HashMap<SegmentId, Segment>,
}

impl Server {
    pub fn new(name: impl Into<String>, tier: impl Into<String>, max_size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            tier: tier.into(),
            curr_size_bytes: 0,
            max_size_bytes,
            segments: HashMap::new(),
        }
    }

    /// Record a hosted segment in the snapshot, accounting its size.
    pub fn add_segment(&mut self, segment: Segment) {
        self.curr_size_bytes += segment.size_bytes;
        self.segments.insert(segment.id(), segment);
    }

    /// Remove a hosted segment from the snapshot, releasing its size.
    pub fn remove_segment(&mut self, id: &SegmentId) -> Option<Segment> {
        let removed = self.segments.remove(id)?;
        self.curr_size_bytes = self.curr_size_bytes.saturating_sub(removed.size_bytes);
        Some(removed)
    }

    pub fn hosts(&self, id: &SegmentId) -> bool {
        self.segments.contains_key(id)
    }

    pub fn segment(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn available_space(&self) -> u64 {
        self.max_size_bytes.saturating_sub(self.curr_size_bytes)
    }

    pub fn percent_used(&self) -> f64 {
        if self.max_size_bytes == 0 {
            return 0.0;
        }
        (self.curr_size_bytes as f64 / self.max_size_bytes as f64) * 100.0
    }
}
