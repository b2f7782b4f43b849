use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::boundary::distinct_directions;
use crate::config::CounterConfig;
use crate::counter::{CountingAggregator, Counts};
use crate::crowd::CrowdMonitor;
use crate::detector::CrossingDetector;
use crate::error::Result;
use crate::frame::Frame;
use crate::geometry::point_in_polygon;
use crate::observation::{ClassNames, Observation};
use crate::sink::EventSink;
use crate::store::TrackStore;
use crate::Point;

/// What happened to one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub processed: usize,
    pub skipped: usize,
    pub outside_roi: usize,
    pub events: usize,
    pub ended: usize,
    pub evicted: usize,
    pub occupancy: usize,
    pub overcrowded: bool,
}

/// Totals handed back when a stream ends.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub frames: u64,
    pub events: u64,
    pub skipped: u64,
    pub evicted: u64,
    pub counts: Counts,
}

/// Single-writer counting loop for one feed. Owns all mutable state of the
/// feed, so independent feeds can run on separate threads without locking.
pub struct StreamDriver<S> {
    store: TrackStore,
    detector: CrossingDetector,
    counter: CountingAggregator,
    classes: ClassNames,
    roi: Option<Vec<Point>>,
    crowd: Option<CrowdMonitor>,
    idle_timeout: Duration,
    evict_every: u64,
    now: Duration,
    occupancy: usize,
    summary: Summary,
    sink: S,
}

impl<S: EventSink> StreamDriver<S> {
    pub fn new(config: &CounterConfig, sink: S) -> Result<Self> {
        config.validate()?;

        let directions = distinct_directions(&config.lines);
        let counter = CountingAggregator::seeded(config.classes.ids(), directions);

        Ok(Self {
            store: TrackStore::new(config.history),
            detector: CrossingDetector::new(config.lines.clone()),
            counter,
            classes: config.classes.clone(),
            roi: config.roi.clone(),
            crowd: config.crowd_threshold.map(CrowdMonitor::new),
            idle_timeout: config.idle_timeout,
            evict_every: config.evict_every,
            now: Duration::ZERO,
            occupancy: 0,
            summary: Summary::default(),
            sink,
        })
    }

    pub fn process_frame(&mut self, frame: &Frame) -> FrameReport {
        let mut report = FrameReport {
            skipped: frame.rejected,
            ..Default::default()
        };

        if frame.timestamp > self.now {
            self.now = frame.timestamp;
        }

        for obs in frame.iter() {
            if !self.classes.contains(obs.class_id) {
                log::debug!(
                    "track {}: class {} not counted, skipping",
                    obs.track_id,
                    obs.class_id
                );
                report.skipped += 1;
                continue;
            }

            if let Some(roi) = &self.roi {
                if !point_in_polygon(&obs.centroid, roi) {
                    report.outside_roi += 1;
                    continue;
                }
            }

            report.occupancy += 1;
            report.processed += 1;

            if self.observe(obs, frame) {
                report.events += 1;
            }
        }

        for track_id in &frame.ended {
            if self.store.end_track(*track_id) {
                report.ended += 1;
            }
        }

        self.occupancy = report.occupancy;
        if let Some(crowd) = self.crowd.as_mut() {
            report.overcrowded = crowd.observe(report.occupancy);
        }

        self.summary.frames += 1;
        if self.summary.frames % self.evict_every == 0 {
            report.evicted = self.store.evict_stale(self.now, self.idle_timeout);
        }

        self.summary.events += report.events as u64;
        self.summary.skipped += report.skipped as u64;
        self.summary.evicted += report.evicted as u64;

        report
    }

    fn observe(&mut self, obs: &Observation, frame: &Frame) -> bool {
        self.store
            .update(obs.track_id, obs.class_id, obs.centroid, obs.timestamp);

        let candidate = self.detector.detect(obs.track_id, obs.class_id, &self.store);
        let Some(mut event) = self.counter.commit(candidate, &mut self.store, obs.timestamp) else {
            return false;
        };

        log::info!(
            "track {} ({}) crossed {} via {:?} at {:.3}s",
            event.track_id,
            self.classes.label_or_unknown(event.class_id),
            event.direction,
            event.segment,
            event.timestamp.as_secs_f64()
        );

        event.bbox = Some(obs.bbox);
        event.frame = frame.image.clone();
        self.sink.emit(event);

        true
    }

    /// Pulls frames until the source is exhausted or `stop` is raised, then
    /// flushes the sink. Bad input is logged and skipped.
    pub fn run<I>(&mut self, source: I, stop: &AtomicBool) -> Summary
    where
        I: IntoIterator<Item = Result<Frame>>,
    {
        for item in source {
            if stop.load(Ordering::Relaxed) {
                log::info!("stop requested, finishing stream");
                break;
            }

            match item {
                Ok(frame) => {
                    self.process_frame(&frame);
                }
                Err(err) => {
                    log::warn!("skipping frame: {}", err);
                    self.summary.skipped += 1;
                }
            }
        }

        self.sink.flush();
        self.summary()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            counts: self.counter.counts(),
            ..self.summary.clone()
        }
    }

    #[inline]
    pub fn counts(&self) -> Counts {
        self.counter.counts()
    }

    #[inline]
    pub fn counter(&self) -> &CountingAggregator {
        &self.counter
    }

    #[inline]
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    #[inline]
    pub fn classes(&self) -> &ClassNames {
        &self.classes
    }

    /// Objects inside the region of interest in the last frame.
    #[inline]
    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    #[inline]
    pub fn overcrowded(&self) -> bool {
        self.crowd
            .as_ref()
            .map(CrowdMonitor::is_overcrowded)
            .unwrap_or(false)
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
