/// True iff `occupancy` meets or exceeds `threshold`.
#[inline]
pub fn evaluate(occupancy: usize, threshold: usize) -> bool {
    occupancy >= threshold
}

/// Remembers the last verdict so alerts fire on transitions only.
#[derive(Debug, Clone)]
pub struct CrowdMonitor {
    threshold: usize,
    overcrowded: bool,
}

impl CrowdMonitor {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            overcrowded: false,
        }
    }

    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[inline]
    pub fn is_overcrowded(&self) -> bool {
        self.overcrowded
    }

    pub fn observe(&mut self, occupancy: usize) -> bool {
        let now = evaluate(occupancy, self.threshold);

        match (self.overcrowded, now) {
            (false, true) => log::warn!(
                "overcrowding: {} objects in region (threshold {})",
                occupancy,
                self.threshold
            ),
            (true, false) => log::info!(
                "occupancy back to {} (threshold {})",
                occupancy,
                self.threshold
            ),
            _ => (),
        }

        self.overcrowded = now;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(!evaluate(49, 50));
        assert!(evaluate(50, 50));
        assert!(evaluate(51, 50));
    }

    #[test]
    fn monitor_tracks_state() {
        let mut m = CrowdMonitor::new(3);
        assert!(!m.observe(2));
        assert!(m.observe(3));
        assert!(m.is_overcrowded());
        assert!(m.observe(4));
        assert!(!m.observe(0));
        assert!(!m.is_overcrowded());
    }
}
