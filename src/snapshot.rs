use std::path::{Path, PathBuf};

use image::imageops;

use crate::error::Result;
use crate::event::CrossingEvent;
use crate::sink::IMAGE_UNAVAILABLE;

/// Saves the crossing object's bounding box crop as a JPEG.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the stored crop, or [`IMAGE_UNAVAILABLE`] if there was nothing
    /// to store or the write failed.
    pub fn save(&self, event: &CrossingEvent, class_label: &str) -> String {
        match self.try_save(event, class_label) {
            Ok(Some(path)) => path.display().to_string(),
            Ok(None) => IMAGE_UNAVAILABLE.to_string(),
            Err(err) => {
                log::warn!(
                    "snapshot for track {} not written: {}",
                    event.track_id,
                    err
                );
                IMAGE_UNAVAILABLE.to_string()
            }
        }
    }

    fn try_save(&self, event: &CrossingEvent, class_label: &str) -> Result<Option<PathBuf>> {
        let (Some(frame), Some(bbox)) = (event.frame.as_ref(), event.bbox) else {
            return Ok(None);
        };

        let crop = bbox.clamp(frame.width(), frame.height());
        if crop.is_empty() {
            log::debug!("empty crop for track {}", event.track_id);
            return Ok(None);
        }

        let dir = self.dir.join(file_label(event.direction.as_str()));
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(format!(
            "{}{}{}.jpg",
            event.recorded_at.format("%Y%m%d_%H%M%S_%6f"),
            file_label(class_label),
            event.track_id
        ));

        let view = imageops::crop_imm(
            &**frame,
            crop.left() as u32,
            crop.top() as u32,
            crop.width() as u32,
            crop.height() as u32,
        );
        view.to_image().save(&path)?;

        Ok(Some(path))
    }
}

/// Lowercase, filesystem safe version of a label.
pub(crate) fn file_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
