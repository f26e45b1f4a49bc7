use std::time::{Duration, Instant};

/// Monotonic elapsed-time clock driving the animation, with pause support.
///
/// While paused, elapsed time stops accruing; resuming continues from the
/// paused value without a jump.
pub struct AnimationClock {
    start: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start: Instant) -> Self {
        Self {
            start,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Elapsed animation time in seconds.
    pub fn elapsed(&self) -> f32 {
        self.elapsed_at(Instant::now())
    }

    fn elapsed_at(&self, now: Instant) -> f32 {
        let frozen = self.paused_at.unwrap_or(now);
        (frozen - self.start - self.paused_total).as_secs_f32()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    fn pause_at(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self) {
        self.resume_at(Instant::now());
    }

    fn resume_at(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now - paused_at;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn elapsed_tracks_wall_time() {
        let t0 = Instant::now();
        let clock = AnimationClock::starting_at(t0);
        assert_eq!(clock.elapsed_at(t0), 0.0);
        assert!((clock.elapsed_at(t0 + 3 * SEC) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn pause_freezes_elapsed() {
        let t0 = Instant::now();
        let mut clock = AnimationClock::starting_at(t0);
        clock.pause_at(t0 + 2 * SEC);
        assert!((clock.elapsed_at(t0 + 10 * SEC) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn resume_continues_without_jump() {
        let t0 = Instant::now();
        let mut clock = AnimationClock::starting_at(t0);
        clock.pause_at(t0 + 2 * SEC);
        clock.resume_at(t0 + 7 * SEC);
        // 5 paused seconds are excluded.
        assert!((clock.elapsed_at(t0 + 8 * SEC) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn double_pause_is_idempotent() {
        let t0 = Instant::now();
        let mut clock = AnimationClock::starting_at(t0);
        clock.pause_at(t0 + SEC);
        clock.pause_at(t0 + 2 * SEC);
        assert!((clock.elapsed_at(t0 + 5 * SEC) - 1.0).abs() < 1e-6);
        assert!(clock.is_paused());
    }
}
