use std::time::Duration;

use qcount::bbox::BBox;
use qcount::{
    BoundarySegment, CounterConfig, CountingAggregator, CrossingDetector, Direction, Frame,
    MemorySink, Observation, Point, StreamDriver, TrackStore,
};

fn obs(track_id: u64, class_id: i32, x: i32, y: i32, t: Duration) -> Observation {
    Observation {
        track_id,
        class_id,
        centroid: Point::new(x, y),
        bbox: BBox::ltrb(x - 10, y - 10, x + 10, y + 10),
        timestamp: t,
    }
}

fn line(name: &str, direction: Direction, a: (i32, i32), b: (i32, i32)) -> BoundarySegment {
    BoundarySegment::new(name, direction, Point::new(a.0, a.1), Point::new(b.0, b.1))
}

const CAR: i32 = 2;

#[test]
fn car_crosses_in_exactly_once() {
    let detector = CrossingDetector::new(vec![line("in", Direction::In, (50, 305), (200, 305))]);
    let mut store = TrackStore::default();
    let mut counter = CountingAggregator::new();

    store.update(7, CAR, Point::new(100, 300), Duration::ZERO);
    store.update(7, CAR, Point::new(100, 310), Duration::from_millis(40));

    let crossing = detector.detect(7, CAR, &store).expect("crossing");
    assert_eq!(crossing.direction, Direction::In);
    assert_eq!(crossing.from, Point::new(100, 300));
    assert_eq!(crossing.to, Point::new(100, 310));

    assert_eq!(counter.count(CAR, &Direction::In), 0);
    let event = counter
        .commit(Some(crossing), &mut store, Duration::from_millis(40))
        .expect("event");
    assert_eq!(event.track_id, 7);
    assert_eq!(counter.count(CAR, &Direction::In), 1);

    // a second pass over the same line
    store.update(7, CAR, Point::new(100, 300), Duration::from_millis(80));
    store.update(7, CAR, Point::new(100, 310), Duration::from_millis(120));
    assert_eq!(detector.detect(7, CAR, &store), None);
    assert_eq!(counter.count(CAR, &Direction::In), 1);
}

#[test]
fn observation_outside_roi_never_reaches_store() {
    let cfg = CounterConfig::new(vec![line("in", Direction::In, (50, 305), (200, 305))])
        .with_roi(vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 100),
        ]);
    let mut driver = StreamDriver::new(&cfg, MemorySink::new()).unwrap();

    let report = driver.process_frame(&Frame::new(
        Duration::ZERO,
        vec![obs(1, CAR, 150, 150, Duration::ZERO), obs(2, CAR, 50, 50, Duration::ZERO)],
    ));

    assert_eq!(report.outside_roi, 1);
    assert_eq!(report.occupancy, 1);
    assert!(driver.store().get(1).is_none());
    assert!(driver.store().get(2).is_some());
}

#[test]
fn idle_track_is_evicted_and_comes_back_fresh() {
    let mut cfg = CounterConfig::new(vec![line("in", Direction::In, (50, 305), (200, 305))]);
    cfg.evict_every = 1;
    cfg.idle_timeout = Duration::from_secs(30);

    let sink = MemorySink::new();
    let mut driver = StreamDriver::new(&cfg, sink.clone()).unwrap();

    let t = Duration::from_secs;
    driver.process_frame(&Frame::new(t(0), vec![obs(7, CAR, 100, 300, t(0))]));
    driver.process_frame(&Frame::new(t(1), vec![obs(7, CAR, 100, 310, t(1))]));
    assert_eq!(sink.len(), 1);
    assert!(driver.store().get(7).unwrap().has_crossed(&Direction::In));

    // 40 simulated seconds without track 7
    let report = driver.process_frame(&Frame::new(t(41), vec![]));
    assert_eq!(report.evicted, 1);
    assert!(driver.store().get(7).is_none());

    // same id again: new history, nothing crossed yet
    driver.process_frame(&Frame::new(t(42), vec![obs(7, CAR, 100, 300, t(42))]));
    let record = driver.store().get(7).unwrap();
    assert_eq!(record.history_len(), 1);
    assert_eq!(record.crossed().count(), 0);

    driver.process_frame(&Frame::new(t(43), vec![obs(7, CAR, 100, 310, t(43))]));
    assert_eq!(sink.len(), 2);
    assert_eq!(driver.counter().count(CAR, &Direction::In), 2);
}

#[test]
fn shared_label_counts_once_per_track() {
    let detector = CrossingDetector::new(vec![
        line("gate_a", Direction::In, (0, 100), (200, 100)),
        line("gate_b", Direction::In, (0, 200), (200, 200)),
    ]);
    let mut store = TrackStore::default();
    let mut counter = CountingAggregator::new();

    let steps = [(50, 90), (50, 110), (50, 190), (50, 210)];
    let mut events = Vec::new();
    for (i, (x, y)) in steps.iter().enumerate() {
        let now = Duration::from_millis(40 * i as u64);
        store.update(3, CAR, Point::new(*x, *y), now);
        let candidate = detector.detect(3, CAR, &store);
        if let Some(ev) = counter.commit(candidate, &mut store, now) {
            events.push(ev);
        }
    }

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].segment, "gate_a");
    assert_eq!(counter.count(CAR, &Direction::In), 1);
    assert_eq!(store.get(3).unwrap().crossed().count(), 1);
}

#[test]
fn crossed_set_bounded_by_distinct_labels() {
    let segments = vec![
        line("a", Direction::In, (0, 100), (400, 100)),
        line("b", Direction::Out, (0, 200), (400, 200)),
        line("c", Direction::In, (0, 300), (400, 300)),
    ];
    let detector = CrossingDetector::new(segments);
    let mut store = TrackStore::default();
    let mut counter = CountingAggregator::new();

    // zig-zag over every line several times
    let mut y = 45;
    let mut dy = 30;
    for i in 0..200u64 {
        let now = Duration::from_millis(40 * i);
        store.update(1, CAR, Point::new(10 + (i as i32 % 7), y), now);
        let candidate = detector.detect(1, CAR, &store);
        counter.commit(candidate, &mut store, now);

        y += dy;
        if !(45..=375).contains(&y) {
            dy = -dy;
        }
    }

    assert_eq!(store.get(1).unwrap().crossed().count(), 2);
    assert_eq!(counter.total(&Direction::In), 1);
    assert_eq!(counter.total(&Direction::Out), 1);
}

#[test]
fn history_never_exceeds_capacity() {
    let mut store = TrackStore::new(5);
    for i in 0..50 {
        let rec = store.update(9, CAR, Point::new(i, 0), Duration::from_millis(i as u64));
        assert!(rec.history_len() <= 5);
    }

    let hist: Vec<i32> = store.get(9).unwrap().history().map(|p| p.x).collect();
    assert_eq!(hist, vec![45, 46, 47, 48, 49]);
}
