use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;

use crate::observation::Observation;
use crate::TrackId;

/// Everything the upstream tracker reports for one frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub timestamp: Duration,
    pub observations: Vec<Observation>,
    /// Tracks the upstream tracker reported as finished.
    pub ended: Vec<TrackId>,
    /// Objects the source already discarded as malformed.
    pub rejected: usize,
    /// Decoded picture, only needed for snapshots.
    pub image: Option<Arc<RgbImage>>,
}

impl Frame {
    pub fn new(timestamp: Duration, observations: Vec<Observation>) -> Self {
        Self {
            timestamp,
            observations,
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: Arc<RgbImage>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_ended(mut self, ended: Vec<TrackId>) -> Self {
        self.ended = ended;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
