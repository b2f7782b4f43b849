//! Directional line-crossing counter for multi-object tracking streams.
//!
//! Feed per-frame tracker output into a [`StreamDriver`]. Each track is
//! counted at most once per direction label, counters are kept per class and
//! direction, and every committed crossing is handed to an [`EventSink`].

pub mod bbox;
pub mod boundary;
pub mod config;
pub mod counter;
pub mod crowd;
pub mod csv_log;
pub mod detector;
pub mod driver;
pub mod error;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod observation;
pub mod sink;
pub mod snapshot;
pub mod source;
pub mod store;

mod circular_queue;
mod track;

pub use boundary::{BoundarySegment, Direction};
pub use config::CounterConfig;
pub use counter::{CountingAggregator, Counts};
pub use detector::{Crossing, CrossingDetector};
pub use driver::{FrameReport, StreamDriver, Summary};
pub use error::{Error, Result};
pub use event::CrossingEvent;
pub use frame::Frame;
pub use observation::{ClassNames, Observation};
pub use sink::{AsyncSink, EventSink, MemorySink};
pub use store::TrackStore;
pub use track::TrackRecord;

use nalgebra as na;

/// Pixel position in frame coordinates.
pub type Point = na::Point2<i32>;

/// Identity assigned by the upstream tracker.
pub type TrackId = u64;
