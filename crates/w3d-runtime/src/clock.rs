use w3d_core::Timestamp;

/// The single time authority of a running scene.
#[derive(Debug, Clone)]
pub struct RuntimeClock {
    now: f64,
    frame: u64,
    max_delta: Option<f64>,
}

impl RuntimeClock {
    pub fn new(max_delta: Option<f64>) -> Self {
        Self {
            now: 0.0,
            frame: 0,
            max_delta,
        }
    }

    /// Advance by one frame and return the effective delta.
    ///
    /// Negative (and NaN) deltas count as zero. Deltas above `max_delta`, when
    /// set, are clamped.
    pub fn advance(&mut self, dt: f64) -> f64 {
        let dt = if dt > 0.0 { dt } else { 0.0 };
        let dt = self.max_delta.map_or(dt, |max| dt.min(max));
        self.now += dt;
        self.frame += 1;
        dt
    }

    pub fn reset(&mut self) {
        self.now = 0.0;
        self.frame = 0;
    }

    /// Seconds since the scene started.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from_seconds(self.now)
    }

    /// Number of ticks since the scene started.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_accumulates() {
        let mut clock = RuntimeClock::new(None);
        clock.advance(0.1);
        clock.advance(0.1);
        assert!((clock.now() - 0.2).abs() < 1e-12);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_clock_passes_long_frames_through() {
        let mut clock = RuntimeClock::new(None);
        assert!((clock.advance(5.0) - 5.0).abs() < 1e-12);
        assert!((clock.now() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_clock_clamps() {
        let mut clock = RuntimeClock::new(Some(0.25));
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f64::NAN), 0.0);
        assert!((clock.advance(5.0) - 0.25).abs() < 1e-12);
        assert!((clock.now() - 0.25).abs() < 1e-12);
        assert_eq!(clock.frame(), 3);
    }

    #[test]
    fn test_clock_reset() {
        let mut clock = RuntimeClock::new(None);
        clock.advance(0.5);
        clock.reset();
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.timestamp().to_string(), "00:00.000");
    }
}
