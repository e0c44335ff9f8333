use std::time::{Duration, Instant};

/// Frame clock read by scenes and entities.
///
/// - `frame`: number of completed frames since start
/// - `elapsed`: seconds between the two most recent advances
/// - `total`: seconds of running time since start (stopped time excluded)
#[derive(Debug, Clone)]
pub struct Clock {
    frame: u32,
    elapsed: f32,
    total: f32,

    /// Running time accumulated before the current run segment.
    banked: Duration,
    /// Start of the current run segment; `None` while stopped.
    started: Option<Instant>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            frame: 0,
            elapsed: 0.0,
            total: 0.0,
            banked: Duration::ZERO,
            started: None,
        }
    }

    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn total(&self) -> f32 {
        self.total
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Starts (or resumes) the clock. No-op while already running.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        if self.started.is_none() {
            self.started = Some(now);
        }
    }

    /// Stops the clock. Running time stops accumulating until `start`.
    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    pub fn stop_at(&mut self, now: Instant) {
        if let Some(started) = self.started.take() {
            self.banked += now.saturating_duration_since(started);
        }
    }

    /// Zeroes all counters and stops the clock.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advances to the current instant. Called once per presented frame.
    pub fn advance(&mut self) {
        self.advance_at(Instant::now());
    }

    /// Advances using an explicit timestamp.
    pub fn advance_at(&mut self, now: Instant) {
        let running = match self.started {
            Some(started) => self.banked + now.saturating_duration_since(started),
            None => self.banked,
        };

        let current = running.as_secs_f32();
        self.elapsed = current - self.total;
        self.total = current;
        self.frame = self.frame.wrapping_add(1);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn new_clock_is_zeroed() {
        let c = Clock::new();
        assert_eq!(c.frame(), 0);
        assert_eq!(c.elapsed(), 0.0);
        assert_eq!(c.total(), 0.0);
        assert!(!c.is_running());
    }

    #[test]
    fn advance_tracks_elapsed_and_total() {
        let t0 = Instant::now();
        let mut c = Clock::new();
        c.start_at(t0);

        c.advance_at(t0 + ms(16));
        assert_eq!(c.frame(), 1);
        assert!((c.elapsed() - 0.016).abs() < 1e-4);
        assert!((c.total() - 0.016).abs() < 1e-4);

        c.advance_at(t0 + ms(50));
        assert_eq!(c.frame(), 2);
        assert!((c.elapsed() - 0.034).abs() < 1e-4);
        assert!((c.total() - 0.050).abs() < 1e-4);
    }

    #[test]
    fn stopped_time_is_not_counted() {
        let t0 = Instant::now();
        let mut c = Clock::new();
        c.start_at(t0);
        c.stop_at(t0 + ms(100));

        // Paused for a second.
        c.start_at(t0 + ms(1100));
        c.advance_at(t0 + ms(1200));

        assert!((c.total() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn advance_while_stopped_keeps_total() {
        let t0 = Instant::now();
        let mut c = Clock::new();
        c.start_at(t0);
        c.advance_at(t0 + ms(10));
        c.stop_at(t0 + ms(10));

        c.advance_at(t0 + ms(500));
        assert_eq!(c.frame(), 2);
        assert_eq!(c.elapsed(), 0.0);
    }

    #[test]
    fn reset_zeroes_everything() {
        let t0 = Instant::now();
        let mut c = Clock::new();
        c.start_at(t0);
        c.advance_at(t0 + ms(10));
        c.reset();
        assert_eq!(c.frame(), 0);
        assert_eq!(c.total(), 0.0);
        assert!(!c.is_running());
    }
}
