use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::time::Duration;

use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::error::Error;
use crate::{Point, TrackId};

/// Id some trackers put on objects they did not assign a track to.
pub const UNTRACKED_ID: TrackId = 0xFFFF_FFFF;

/// One tracked object in one frame, already validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub track_id: TrackId,
    pub class_id: i32,
    pub centroid: Point,
    pub bbox: BBox<Ltrb>,
    pub timestamp: Duration,
}

/// Tracker output as it comes off the wire. Every field is optional here,
/// validation happens in the conversion to [`Observation`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawObservation {
    #[serde(rename = "id")]
    pub track_id: Option<TrackId>,
    #[serde(rename = "c")]
    pub class_id: Option<i32>,
    #[serde(default)]
    pub bbox: Option<[i32; 4]>,
    /// Centre-size box, used when `bbox` is absent.
    #[serde(default)]
    pub xywh: Option<[i32; 4]>,
    #[serde(rename = "center", default)]
    pub centroid: Option<[i32; 2]>,
}

impl TryFrom<(RawObservation, Duration)> for Observation {
    type Error = Error;

    fn try_from((raw, timestamp): (RawObservation, Duration)) -> Result<Self, Self::Error> {
        let track_id = raw
            .track_id
            .ok_or_else(|| Error::MalformedObservation("missing track id".into()))?;

        if track_id == UNTRACKED_ID {
            return Err(Error::MalformedObservation(format!(
                "untracked object (id {:#x})",
                track_id
            )));
        }

        let class_id = raw
            .class_id
            .ok_or_else(|| Error::MalformedObservation(format!("track {}: missing class", track_id)))?;

        let bbox = match (raw.bbox, raw.xywh) {
            (Some([l, t, r, b]), _) if r >= l && b >= t => Some(BBox::ltrb(l, t, r, b)),
            (Some(bbox), _) => {
                return Err(Error::MalformedObservation(format!(
                    "track {}: inverted bbox {:?}",
                    track_id, bbox
                )))
            }
            (None, Some([x, y, w, h])) if w >= 0 && h >= 0 => {
                Some(BBox::xywh(x, y, w, h).as_ltrb())
            }
            (None, Some(xywh)) => {
                return Err(Error::MalformedObservation(format!(
                    "track {}: negative box size {:?}",
                    track_id, xywh
                )))
            }
            (None, None) => None,
        };

        let centroid = match (raw.centroid, bbox) {
            (Some([x, y]), _) => Point::new(x, y),
            (None, Some(bbox)) => bbox.center(),
            (None, None) => {
                return Err(Error::MalformedObservation(format!(
                    "track {}: neither centroid nor bbox",
                    track_id
                )))
            }
        };

        Ok(Observation {
            track_id,
            class_id,
            centroid,
            bbox: bbox.unwrap_or_else(|| BBox::ltrb(centroid.x, centroid.y, centroid.x, centroid.y)),
            timestamp,
        })
    }
}

/// Class id to human readable label. Observations of classes missing from
/// the table are not counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames(BTreeMap<i32, String>);

impl ClassNames {
    pub fn new(map: BTreeMap<i32, String>) -> Self {
        Self(map)
    }

    /// COCO vehicle classes.
    pub fn vehicles() -> Self {
        Self(
            [(2, "car"), (3, "motorcycle"), (5, "bus"), (7, "truck")]
                .into_iter()
                .map(|(id, name)| (id, name.to_string()))
                .collect(),
        )
    }

    #[inline]
    pub fn contains(&self, class_id: i32) -> bool {
        self.0.contains_key(&class_id)
    }

    #[inline]
    pub fn label(&self, class_id: i32) -> Option<&str> {
        self.0.get(&class_id).map(String::as_str)
    }

    /// Label for display purposes, falls back to `unknown`.
    pub fn label_or_unknown(&self, class_id: i32) -> &str {
        self.label(class_id).unwrap_or("unknown")
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.0.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::vehicles()
    }
}
