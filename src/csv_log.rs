use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::event::CrossingEvent;
use crate::observation::ClassNames;
use crate::sink::{EventSink, IMAGE_UNAVAILABLE};
use crate::snapshot::{file_label, SnapshotWriter};

pub const CSV_HEADER: &str = "timestamp,track_id,class,image_path,direction";

const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Appends one row per crossing to `crossings_<direction>.csv` inside `dir`.
pub struct CsvSink {
    dir: PathBuf,
    classes: ClassNames,
    snapshots: Option<SnapshotWriter>,
    retries: u32,
    backoff: Duration,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(dir: P, classes: ClassNames) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            classes,
            snapshots: None,
            retries: 3,
            backoff: RETRY_BACKOFF,
        }
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotWriter) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn path_for(&self, direction: &str) -> PathBuf {
        self.dir
            .join(format!("crossings_{}.csv", file_label(direction)))
    }

    fn append(&self, path: &Path, row: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", CSV_HEADER)?;
        }
        writeln!(file, "{}", row)?;

        Ok(())
    }
}

impl EventSink for CsvSink {
    fn emit(&mut self, event: CrossingEvent) {
        let class = self.classes.label_or_unknown(event.class_id).to_string();
        let image_ref = match &self.snapshots {
            Some(snapshots) => snapshots.save(&event, &class),
            None => IMAGE_UNAVAILABLE.to_string(),
        };

        let timestamp = event.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let track_id = event.track_id.to_string();
        let direction = event.direction.as_str().to_ascii_lowercase();
        let row = format_row(&[
            timestamp.as_str(),
            track_id.as_str(),
            class.as_str(),
            image_ref.as_str(),
            direction.as_str(),
        ]);
        let path = self.path_for(event.direction.as_str());

        let mut attempt = 0;
        loop {
            match self.append(&path, &row) {
                Ok(()) => break,
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    log::debug!(
                        "append to {} failed (attempt {}): {}",
                        path.display(),
                        attempt,
                        err
                    );
                    std::thread::sleep(self.backoff);
                }
                Err(err) => {
                    log::warn!(
                        "dropping log row for track {} after {} attempts: {}",
                        event.track_id,
                        attempt + 1,
                        err
                    );
                    break;
                }
            }
        }
    }
}

fn format_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn escape(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
