use std::fmt;
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use crate::Point;

/// Direction label attached to a boundary segment. Counting is exactly-once
/// per label, so two segments sharing a label count a track only once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    In,
    Out,
    Custom(String),
}

impl Direction {
    pub fn as_str(&self) -> &str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
            Direction::Custom(label) => label,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Direction {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("in") {
            Direction::In
        } else if s.eq_ignore_ascii_case("out") {
            Direction::Out
        } else {
            Direction::Custom(s.to_string())
        }
    }
}

impl From<String> for Direction {
    fn from(s: String) -> Self {
        Direction::from(s.as_str())
    }
}

impl From<Direction> for String {
    fn from(d: Direction) -> Self {
        d.as_str().to_string()
    }
}

impl FromStr for Direction {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

/// A virtual gate. Immutable once configured.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySegment {
    pub name: String,
    pub direction: Direction,
    pub p1: Point,
    pub p2: Point,
}

impl BoundarySegment {
    pub fn new<S: ToString>(name: S, direction: Direction, p1: Point, p2: Point) -> Self {
        Self {
            name: name.to_string(),
            direction,
            p1,
            p2,
        }
    }
}

/// Distinct direction labels in configuration order.
pub fn distinct_directions(segments: &[BoundarySegment]) -> Vec<Direction> {
    let mut out: Vec<Direction> = Vec::new();
    for seg in segments {
        if !out.contains(&seg.direction) {
            out.push(seg.direction.clone());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_known_labels() {
        assert_eq!(Direction::from("in"), Direction::In);
        assert_eq!(Direction::from(" OUT "), Direction::Out);
        assert_eq!(
            Direction::from("north"),
            Direction::Custom("north".to_string())
        );
        assert_eq!(Direction::In.to_string(), "IN");
    }

    #[test]
    fn distinct_labels_keep_order() {
        let seg = |name: &str, d: Direction| {
            BoundarySegment::new(name, d, Point::new(0, 0), Point::new(1, 1))
        };
        let segs = [
            seg("a", Direction::Out),
            seg("b", Direction::In),
            seg("c", Direction::Out),
        ];
        assert_eq!(
            distinct_directions(&segs),
            vec![Direction::Out, Direction::In]
        );
    }
}
