use std::collections::HashMap;
use std::time::Duration;

use crate::boundary::Direction;
use crate::track::TrackRecord;
use crate::{Point, TrackId};

pub const DEFAULT_HISTORY: usize = 30;

/// Per-feed index of live tracks. The only place track state is mutated.
#[derive(Debug)]
pub struct TrackStore {
    tracks: HashMap<TrackId, TrackRecord>,
    history: usize,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

impl TrackStore {
    pub fn new(history: usize) -> Self {
        Self {
            tracks: HashMap::with_capacity(64),
            history: history.max(1),
        }
    }

    #[inline]
    pub fn history_capacity(&self) -> usize {
        self.history
    }

    /// Records a new position, creating the track on first sight.
    pub fn update(
        &mut self,
        track_id: TrackId,
        class_id: i32,
        centroid: Point,
        now: Duration,
    ) -> &TrackRecord {
        let history = self.history;
        let record = self
            .tracks
            .entry(track_id)
            .or_insert_with(|| TrackRecord::new(track_id, class_id, history, now));

        record.observe(class_id, centroid, now);
        record
    }

    /// Returns `false` when the track is unknown, which means the caller and
    /// the store disagree about which tracks are alive.
    pub fn mark_crossed(&mut self, track_id: TrackId, direction: &Direction) -> bool {
        match self.tracks.get_mut(&track_id) {
            Some(record) => {
                record.mark_crossed(direction);
                true
            }
            None => {
                log::warn!(
                    "mark_crossed({}) on unknown track {}, ignoring",
                    direction,
                    track_id
                );
                false
            }
        }
    }

    pub fn has_crossed(&self, track_id: TrackId, direction: &Direction) -> bool {
        self.tracks
            .get(&track_id)
            .map(|r| r.has_crossed(direction))
            .unwrap_or(false)
    }

    /// Drops every track idle for longer than `idle_timeout`.
    pub fn evict_stale(&mut self, now: Duration, idle_timeout: Duration) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|_, r| r.idle_for(now) <= idle_timeout);

        let removed = before - self.tracks.len();
        if removed > 0 {
            log::debug!(
                "evicted {} stale tracks, {} alive",
                removed,
                self.tracks.len()
            );
        }

        removed
    }

    /// Explicit end-of-track signal from the upstream tracker.
    pub fn end_track(&mut self, track_id: TrackId) -> bool {
        self.tracks.remove(&track_id).is_some()
    }

    pub fn previous_and_current(&self, track_id: TrackId) -> Option<(Point, Point)> {
        self.tracks.get(&track_id)?.last_pair()
    }

    #[inline]
    pub fn get(&self, track_id: TrackId) -> Option<&TrackRecord> {
        self.tracks.get(&track_id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &TrackRecord> {
        self.tracks.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn history_is_bounded_fifo() {
        let mut store = TrackStore::new(3);
        for i in 0..5 {
            let rec = store.update(1, 2, Point::new(i, i), secs(i as u64));
            assert!(rec.history_len() <= 3);
        }

        let hist: Vec<_> = store.get(1).unwrap().history().copied().collect();
        assert_eq!(
            hist,
            vec![Point::new(2, 2), Point::new(3, 3), Point::new(4, 4)]
        );
    }

    #[test]
    fn previous_and_current_needs_two_positions() {
        let mut store = TrackStore::default();
        assert_eq!(store.previous_and_current(1), None);

        store.update(1, 2, Point::new(0, 0), secs(0));
        assert_eq!(store.previous_and_current(1), None);

        store.update(1, 2, Point::new(5, 5), secs(1));
        assert_eq!(
            store.previous_and_current(1),
            Some((Point::new(0, 0), Point::new(5, 5)))
        );
    }

    #[test]
    fn last_seen_never_goes_back() {
        let mut store = TrackStore::default();
        store.update(1, 2, Point::new(0, 0), secs(10));
        store.update(1, 2, Point::new(1, 0), secs(4));

        assert_eq!(store.get(1).unwrap().last_seen(), secs(10));
    }

    #[test]
    fn mark_crossed_is_idempotent() {
        let mut store = TrackStore::default();
        store.update(1, 2, Point::new(0, 0), secs(0));

        assert!(store.mark_crossed(1, &Direction::In));
        assert!(store.mark_crossed(1, &Direction::In));
        assert!(store.has_crossed(1, &Direction::In));
        assert!(!store.has_crossed(1, &Direction::Out));
        assert_eq!(store.get(1).unwrap().crossed().count(), 1);
    }

    #[test]
    fn mark_crossed_unknown_track_is_noop() {
        let mut store = TrackStore::default();
        assert!(!store.mark_crossed(99, &Direction::In));
        assert!(store.is_empty());
        assert!(!store.has_crossed(99, &Direction::In));
    }

    #[test]
    fn evicts_only_stale_tracks() {
        let mut store = TrackStore::default();
        store.update(1, 2, Point::new(0, 0), secs(0));
        store.update(2, 2, Point::new(0, 0), secs(20));
        store.update(3, 2, Point::new(0, 0), secs(30));

        let timeout = secs(10);
        let now = secs(40);
        let removed = store.evict_stale(now, timeout);

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.iter().all(|r| r.idle_for(now) <= timeout));
        assert!(store.get(3).is_some());
    }

    #[test]
    fn idle_exactly_at_timeout_survives() {
        let mut store = TrackStore::default();
        store.update(1, 2, Point::new(0, 0), secs(0));

        assert_eq!(store.evict_stale(secs(10), secs(10)), 0);
        assert_eq!(store.evict_stale(secs(11), secs(10)), 1);
    }

    #[test]
    fn end_track_removes_record() {
        let mut store = TrackStore::default();
        store.update(1, 2, Point::new(0, 0), secs(0));

        assert!(store.end_track(1));
        assert!(!store.end_track(1));
        assert!(store.get(1).is_none());
    }
}
