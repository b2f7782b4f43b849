use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Local;

use crate::boundary::Direction;
use crate::detector::Crossing;
use crate::event::CrossingEvent;
use crate::store::TrackStore;

pub type Counts = BTreeMap<(i32, Direction), u64>;

/// Owns the per-class, per-direction counters. Counters only ever go up.
#[derive(Debug, Default, Clone)]
pub struct CountingAggregator {
    counts: Counts,
}

impl CountingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts every `(class, direction)` pair at zero so it shows up in
    /// snapshots before the first crossing.
    pub fn seeded<C, D>(classes: C, directions: D) -> Self
    where
        C: IntoIterator<Item = i32>,
        D: IntoIterator<Item = Direction> + Clone,
    {
        let mut counts = Counts::new();
        for class_id in classes {
            for dir in directions.clone() {
                counts.insert((class_id, dir), 0);
            }
        }

        Self { counts }
    }

    /// Turns a detector result into a counted event. The track is marked as
    /// crossed before the counter moves, so the same label cannot be counted
    /// twice for it.
    pub fn commit(
        &mut self,
        candidate: Option<Crossing>,
        store: &mut TrackStore,
        at: Duration,
    ) -> Option<CrossingEvent> {
        let crossing = candidate?;

        if store.has_crossed(crossing.track_id, &crossing.direction) {
            log::debug!(
                "track {} already counted for {}, ignoring",
                crossing.track_id,
                crossing.direction
            );
            return None;
        }

        if !store.mark_crossed(crossing.track_id, &crossing.direction) {
            return None;
        }

        *self
            .counts
            .entry((crossing.class_id, crossing.direction.clone()))
            .or_insert(0) += 1;

        Some(CrossingEvent {
            timestamp: at,
            recorded_at: Local::now(),
            track_id: crossing.track_id,
            class_id: crossing.class_id,
            direction: crossing.direction,
            segment: crossing.segment,
            from: crossing.from,
            to: crossing.to,
            bbox: None,
            frame: None,
        })
    }

    /// Read-only copy of the counters.
    pub fn counts(&self) -> Counts {
        self.counts.clone()
    }

    pub fn count(&self, class_id: i32, direction: &Direction) -> u64 {
        self.counts
            .get(&(class_id, direction.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self, direction: &Direction) -> u64 {
        self.counts
            .iter()
            .filter(|((_, d), _)| d == direction)
            .map(|(_, n)| *n)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn crossing(track_id: u64, class_id: i32, direction: Direction) -> Crossing {
        Crossing {
            track_id,
            class_id,
            direction,
            segment: "line".into(),
            from: Point::new(0, 0),
            to: Point::new(0, 10),
        }
    }

    #[test]
    fn none_passes_through() {
        let mut agg = CountingAggregator::new();
        let mut store = TrackStore::default();

        assert!(agg.commit(None, &mut store, Duration::ZERO).is_none());
        assert!(agg.counts().is_empty());
    }

    #[test]
    fn commit_counts_and_marks() {
        let mut agg = CountingAggregator::new();
        let mut store = TrackStore::default();
        store.update(7, 2, Point::new(0, 0), Duration::ZERO);

        let ev = agg
            .commit(
                Some(crossing(7, 2, Direction::In)),
                &mut store,
                Duration::from_secs(1),
            )
            .unwrap();

        assert_eq!(ev.track_id, 7);
        assert_eq!(ev.direction, Direction::In);
        assert_eq!(ev.timestamp, Duration::from_secs(1));
        assert_eq!(agg.count(2, &Direction::In), 1);
        assert!(store.has_crossed(7, &Direction::In));
    }

    #[test]
    fn same_crossing_counts_once() {
        let mut agg = CountingAggregator::new();
        let mut store = TrackStore::default();
        store.update(7, 2, Point::new(100, 300), Duration::ZERO);
        store.update(7, 2, Point::new(100, 310), Duration::from_millis(40));

        let c = crossing(7, 2, Direction::In);
        let first = agg.commit(Some(c.clone()), &mut store, Duration::from_millis(40));
        let second = agg.commit(Some(c), &mut store, Duration::from_millis(40));

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(agg.count(2, &Direction::In), 1);
    }

    #[test]
    fn other_label_still_counts() {
        let mut agg = CountingAggregator::new();
        let mut store = TrackStore::default();
        store.update(7, 2, Point::new(0, 0), Duration::ZERO);

        agg.commit(Some(crossing(7, 2, Direction::In)), &mut store, Duration::ZERO);
        agg.commit(Some(crossing(7, 2, Direction::In)), &mut store, Duration::ZERO);
        agg.commit(Some(crossing(7, 2, Direction::Out)), &mut store, Duration::ZERO);

        assert_eq!(agg.count(2, &Direction::In), 1);
        assert_eq!(agg.count(2, &Direction::Out), 1);
    }

    #[test]
    fn unknown_track_is_not_counted() {
        let mut agg = CountingAggregator::new();
        let mut store = TrackStore::default();

        let ev = agg.commit(
            Some(crossing(1, 2, Direction::Out)),
            &mut store,
            Duration::ZERO,
        );
        assert!(ev.is_none());
        assert_eq!(agg.count(2, &Direction::Out), 0);
    }

    #[test]
    fn counters_are_monotonic() {
        let mut agg = CountingAggregator::seeded([2, 3], vec![Direction::In, Direction::Out]);
        let mut store = TrackStore::default();
        let mut last = agg.counts();

        for id in 0..20u64 {
            store.update(id, 2 + (id % 2) as i32, Point::new(0, 0), Duration::ZERO);
            let dir = if id % 3 == 0 { Direction::Out } else { Direction::In };
            agg.commit(
                Some(crossing(id, 2 + (id % 2) as i32, dir)),
                &mut store,
                Duration::ZERO,
            );

            let now = agg.counts();
            for (key, value) in &last {
                assert!(now[key] >= *value);
            }
            last = now;
        }

        assert_eq!(agg.total(&Direction::In) + agg.total(&Direction::Out), 20);
    }

    #[test]
    fn seeded_pairs_start_at_zero() {
        let agg = CountingAggregator::seeded([2, 7], vec![Direction::In, Direction::Out]);
        let counts = agg.counts();

        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&n| n == 0));
        assert_eq!(agg.count(7, &Direction::Out), 0);
    }
}
