use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::observation::{Observation, RawObservation};
use crate::TrackId;

/// One line of tracker output.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawFrame {
    /// seconds since stream start
    pub ts: f64,
    #[serde(default)]
    pub objects: Vec<RawObservation>,
    #[serde(default)]
    pub ended: Vec<TrackId>,
}

impl TryFrom<RawFrame> for Frame {
    type Error = Error;

    fn try_from(raw: RawFrame) -> Result<Self> {
        let timestamp = Duration::try_from_secs_f64(raw.ts).map_err(|_| {
            Error::MalformedObservation(format!("invalid frame timestamp {}", raw.ts))
        })?;

        let mut rejected = 0;
        let mut observations = Vec::with_capacity(raw.objects.len());
        for obj in raw.objects {
            match Observation::try_from((obj, timestamp)) {
                Ok(obs) => observations.push(obs),
                Err(err) => {
                    log::debug!("{:.3}s: skipping object: {}", raw.ts, err);
                    rejected += 1;
                }
            }
        }

        let mut frame = Frame::new(timestamp, observations).with_ended(raw.ended);
        frame.rejected = rejected;

        Ok(frame)
    }
}

/// Reads frames from JSON lines, one frame per line. Blank lines are
/// ignored; unparsable lines are yielded as errors and reading continues.
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_no: usize,
    done: bool,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
            done: false,
        }
    }

    #[inline]
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line.clear();

            match self.reader.read_line(&mut self.line) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_no += 1;
                    let text = self.line.trim();
                    if text.is_empty() {
                        continue;
                    }

                    return Some(
                        serde_json::from_str::<RawFrame>(text)
                            .map_err(Error::from)
                            .and_then(Frame::try_from),
                    );
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            }
        }

        None
    }
}
