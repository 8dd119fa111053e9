/// Turns host frame timestamps (milliseconds) into per-tick elapsed time.
///
/// The first timestamp only primes the clock. Deltas are capped so a long
/// stall (e.g. a backgrounded tab) does not move settlers across the map in
/// a single tick.
pub struct FrameClock {
    /// Timestamp of the previous frame, if any.
    last: Option<f64>,
    /// Largest delta handed out, in milliseconds.
    max_delta_ms: f32,
}

impl FrameClock {
    pub fn new(max_delta_ms: f32) -> Self {
        Self {
            last: None,
            max_delta_ms,
        }
    }

    /// Record a frame timestamp and return the elapsed milliseconds since the
    /// previous one. Returns 0 for the first frame and for timestamps that go
    /// backwards.
    pub fn delta(&mut self, timestamp_ms: f64) -> f32 {
        let dt = match self.last {
            Some(last) if timestamp_ms > last => (timestamp_ms - last) as f32,
            _ => 0.0,
        };
        self.last = Some(timestamp_ms);
        dt.min(self.max_delta_ms)
    }

    /// Forget the previous timestamp; the next frame yields 0 again.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn max_delta_ms(&self) -> f32 {
        self.max_delta_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_zero() {
        let mut clock = FrameClock::new(250.0);
        assert_eq!(clock.delta(12_345.0), 0.0);
    }

    #[test]
    fn subsequent_frames_measure_elapsed() {
        let mut clock = FrameClock::new(250.0);
        clock.delta(1000.0);
        let dt = clock.delta(1016.5);
        assert!((dt - 16.5).abs() < 1e-4, "dt was {}", dt);
    }

    #[test]
    fn long_stalls_are_capped() {
        let mut clock = FrameClock::new(250.0);
        clock.delta(0.0);
        assert_eq!(clock.delta(10_000.0), 250.0);
    }

    #[test]
    fn backwards_time_yields_zero() {
        let mut clock = FrameClock::new(250.0);
        clock.delta(500.0);
        assert_eq!(clock.delta(400.0), 0.0);
        // Clock follows the new timestamp afterwards
        let dt = clock.delta(410.0);
        assert!((dt - 10.0).abs() < 1e-4);
    }

    #[test]
    fn reset_reprimes_clock() {
        let mut clock = FrameClock::new(250.0);
        clock.delta(100.0);
        clock.reset();
        assert_eq!(clock.delta(200.0), 0.0);
    }
}
