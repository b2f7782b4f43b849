use std::collections::BTreeSet;
use std::time::Duration;

use crate::boundary::Direction;
use crate::circular_queue::CircularQueue;
use crate::{Point, TrackId};

#[derive(Debug, Clone)]
pub struct TrackRecord {
    pub track_id: TrackId,
    pub class_id: i32,
    history: CircularQueue<Point>,
    crossed: BTreeSet<Direction>,
    last_seen: Duration,
}

impl TrackRecord {
    pub(crate) fn new(track_id: TrackId, class_id: i32, capacity: usize, now: Duration) -> Self {
        Self {
            track_id,
            class_id,
            history: CircularQueue::with_capacity(capacity),
            crossed: BTreeSet::new(),
            last_seen: now,
        }
    }

    pub(crate) fn observe(&mut self, class_id: i32, centroid: Point, now: Duration) {
        self.class_id = class_id;
        self.history.push(centroid);

        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    pub(crate) fn mark_crossed(&mut self, direction: &Direction) {
        if !self.crossed.contains(direction) {
            self.crossed.insert(direction.clone());
        }
    }

    #[inline]
    pub fn has_crossed(&self, direction: &Direction) -> bool {
        self.crossed.contains(direction)
    }

    #[inline]
    pub fn crossed(&self) -> impl Iterator<Item = &Direction> {
        self.crossed.iter()
    }

    /// Centroids from oldest to newest.
    #[inline]
    pub fn history(&self) -> impl Iterator<Item = &Point> {
        self.history.iter()
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn last_position(&self) -> Option<Point> {
        self.history.latest().copied()
    }

    #[inline]
    pub fn last_pair(&self) -> Option<(Point, Point)> {
        self.history.last_pair()
    }

    #[inline]
    pub fn last_seen(&self) -> Duration {
        self.last_seen
    }

    #[inline]
    pub fn idle_for(&self, now: Duration) -> Duration {
        now.saturating_sub(self.last_seen)
    }
}
