use crate::boundary::{BoundarySegment, Direction};
use crate::geometry::segments_intersect;
use crate::store::TrackStore;
use crate::{Point, TrackId};

/// A crossing the detector found but nobody has counted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    pub track_id: TrackId,
    pub class_id: i32,
    pub direction: Direction,
    pub segment: String,
    pub from: Point,
    pub to: Point,
}

pub struct CrossingDetector {
    segments: Vec<BoundarySegment>,
}

impl CrossingDetector {
    pub fn new(segments: Vec<BoundarySegment>) -> Self {
        Self { segments }
    }

    #[inline]
    pub fn segments(&self) -> &[BoundarySegment] {
        &self.segments
    }

    /// Tests the track's latest motion step against every segment in
    /// configuration order. The first segment whose label the track has not
    /// crossed yet and which the step intersects wins.
    ///
    /// Only the last two samples are compared, a step that jumps over a line
    /// between two frames is missed.
    pub fn detect(&self, track_id: TrackId, class_id: i32, store: &TrackStore) -> Option<Crossing> {
        let (from, to) = store.previous_and_current(track_id)?;

        self.segments
            .iter()
            .filter(|seg| !store.has_crossed(track_id, &seg.direction))
            .find(|seg| segments_intersect(&seg.p1, &seg.p2, &from, &to))
            .map(|seg| Crossing {
                track_id,
                class_id,
                direction: seg.direction.clone(),
                segment: seg.name.clone(),
                from,
                to,
            })
    }
}
