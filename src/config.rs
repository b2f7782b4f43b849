use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_derive::Deserialize;

use crate::boundary::{BoundarySegment, Direction};
use crate::error::{Error, Result};
use crate::observation::ClassNames;
use crate::store::DEFAULT_HISTORY;
use crate::Point;

const DEFAULT_IDLE_TIMEOUT_SECS: f64 = 30.0;
const DEFAULT_EVICT_EVERY_FRAMES: u64 = 30;
const DEFAULT_LOG_DIR: &str = ".";
const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Deserialize, Default)]
struct CounterConfigFile {
    roi: Option<Vec<[i32; 2]>>,
    #[serde(default)]
    lines: Vec<LineConfigFile>,
    classes: Option<BTreeMap<String, String>>,
    tracking: Option<TrackingConfigFile>,
    crowd: Option<CrowdConfigFile>,
    output: Option<OutputConfigFile>,
}

#[derive(Debug, Deserialize)]
struct LineConfigFile {
    name: Option<String>,
    direction: String,
    points: Vec<[i32; 2]>,
}

#[derive(Debug, Deserialize, Default)]
struct TrackingConfigFile {
    history: Option<usize>,
    idle_timeout_secs: Option<f64>,
    evict_every_frames: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct CrowdConfigFile {
    threshold: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct OutputConfigFile {
    log_dir: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
    retries: Option<u32>,
    queue_capacity: Option<usize>,
}

/// Static configuration of one counting feed. Loaded once, never mutated
/// while frames are processed.
#[derive(Debug, Clone)]
pub struct CounterConfig {
    pub lines: Vec<BoundarySegment>,
    pub roi: Option<Vec<Point>>,
    pub classes: ClassNames,
    pub history: usize,
    pub idle_timeout: Duration,
    pub evict_every: u64,
    pub crowd_threshold: Option<usize>,
    pub output: OutputSettings,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub log_dir: PathBuf,
    pub snapshot_dir: Option<PathBuf>,
    pub retries: u32,
    pub queue_capacity: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            snapshot_dir: None,
            retries: DEFAULT_RETRIES,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl CounterConfig {
    /// Defaults around the given lines. Call [`CounterConfig::validate`]
    /// before use.
    pub fn new(lines: Vec<BoundarySegment>) -> Self {
        Self {
            lines,
            roi: None,
            classes: ClassNames::default(),
            history: DEFAULT_HISTORY,
            idle_timeout: Duration::from_secs_f64(DEFAULT_IDLE_TIMEOUT_SECS),
            evict_every: DEFAULT_EVICT_EVERY_FRAMES,
            crowd_threshold: None,
            output: OutputSettings::default(),
        }
    }

    pub fn with_roi(mut self, roi: Vec<Point>) -> Self {
        self.roi = Some(roi);
        self
    }

    /// Reads a TOML file, applies `QCOUNT_*` environment overrides and
    /// validates the result.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;

        let file: CounterConfigFile = toml::from_str(&raw)?;
        let mut cfg = Self::from_file(file)?;
        cfg.apply_env()?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// Parses and validates TOML without looking at the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: CounterConfigFile = toml::from_str(raw)?;
        let mut cfg = Self::from_file(file)?;
        cfg.validate()?;

        Ok(cfg)
    }

    fn from_file(file: CounterConfigFile) -> Result<Self> {
        let mut lines = Vec::with_capacity(file.lines.len());
        for (idx, line) in file.lines.into_iter().enumerate() {
            if line.points.len() != 2 {
                return Err(Error::Config(format!(
                    "line #{} needs exactly 2 points, got {}",
                    idx,
                    line.points.len()
                )));
            }

            let direction = Direction::from(line.direction.as_str());
            let name = line
                .name
                .unwrap_or_else(|| format!("{}_{}", direction.as_str().to_lowercase(), idx));
            let [x1, y1] = line.points[0];
            let [x2, y2] = line.points[1];

            lines.push(BoundarySegment::new(
                name,
                direction,
                Point::new(x1, y1),
                Point::new(x2, y2),
            ));
        }

        let classes = match file.classes {
            Some(map) => {
                let mut parsed = BTreeMap::new();
                for (id, name) in map {
                    let id: i32 = id.trim().parse().map_err(|_| {
                        Error::Config(format!("class id {:?} is not an integer", id))
                    })?;
                    parsed.insert(id, name);
                }
                ClassNames::new(parsed)
            }
            None => ClassNames::default(),
        };

        let tracking = file.tracking.unwrap_or_default();
        let idle_timeout = parse_secs(
            tracking
                .idle_timeout_secs
                .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS),
        )?;

        let output = file.output.unwrap_or_default();

        Ok(Self {
            lines,
            roi: file
                .roi
                .map(|pts| pts.into_iter().map(|[x, y]| Point::new(x, y)).collect()),
            classes,
            history: tracking.history.unwrap_or(DEFAULT_HISTORY),
            idle_timeout,
            evict_every: tracking
                .evict_every_frames
                .unwrap_or(DEFAULT_EVICT_EVERY_FRAMES),
            crowd_threshold: file.crowd.and_then(|c| c.threshold),
            output: OutputSettings {
                log_dir: output
                    .log_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
                snapshot_dir: output.snapshot_dir,
                retries: output.retries.unwrap_or(DEFAULT_RETRIES),
                queue_capacity: output.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
            },
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(secs) = std::env::var("QCOUNT_IDLE_TIMEOUT_SECS") {
            let secs: f64 = secs.trim().parse().map_err(|_| {
                Error::Config("QCOUNT_IDLE_TIMEOUT_SECS must be a number of seconds".into())
            })?;
            self.idle_timeout = parse_secs(secs)?;
        }
        if let Ok(dir) = std::env::var("QCOUNT_LOG_DIR") {
            if !dir.trim().is_empty() {
                self.output.log_dir = PathBuf::from(dir);
            }
        }
        if let Ok(dir) = std::env::var("QCOUNT_SNAPSHOT_DIR") {
            if !dir.trim().is_empty() {
                self.output.snapshot_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(threshold) = std::env::var("QCOUNT_CROWD_THRESHOLD") {
            let threshold: usize = threshold.trim().parse().map_err(|_| {
                Error::Config("QCOUNT_CROWD_THRESHOLD must be a non-negative integer".into())
            })?;
            self.crowd_threshold = Some(threshold);
        }

        Ok(())
    }

    /// Rejects configurations the counter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.lines.is_empty() {
            return Err(Error::Config("at least one counting line is required".into()));
        }

        let mut names = HashSet::new();
        for line in &self.lines {
            if !names.insert(line.name.as_str()) {
                return Err(Error::Config(format!("duplicate line name {:?}", line.name)));
            }
            if line.p1 == line.p2 {
                return Err(Error::Config(format!(
                    "line {:?} has identical endpoints",
                    line.name
                )));
            }
        }

        if let Some(roi) = &self.roi {
            if roi.len() < 3 {
                return Err(Error::Config(format!(
                    "roi polygon needs at least 3 points, got {}",
                    roi.len()
                )));
            }
        }

        if self.history < 2 {
            return Err(Error::Config("tracking.history must be at least 2".into()));
        }
        if self.evict_every == 0 {
            return Err(Error::Config(
                "tracking.evict_every_frames must be greater than zero".into(),
            ));
        }
        if self.idle_timeout.is_zero() {
            return Err(Error::Config(
                "tracking.idle_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.classes.is_empty() {
            return Err(Error::Config("class table is empty".into()));
        }

        Ok(())
    }
}

fn parse_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| Error::Config(format!("invalid duration: {} seconds", secs)))
}
