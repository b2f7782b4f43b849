use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use image::RgbImage;

use crate::bbox::{BBox, Ltrb};
use crate::boundary::Direction;
use crate::{Point, TrackId};

/// A committed crossing. Built once by the aggregator, then owned by the sink.
#[derive(Debug, Clone)]
pub struct CrossingEvent {
    /// Stream time of the frame that completed the crossing.
    pub timestamp: Duration,
    /// Wall clock time of the commit.
    pub recorded_at: DateTime<Local>,
    pub track_id: TrackId,
    pub class_id: i32,
    pub direction: Direction,
    pub segment: String,
    pub from: Point,
    pub to: Point,
    pub bbox: Option<BBox<Ltrb>>,
    pub frame: Option<Arc<RgbImage>>,
}
