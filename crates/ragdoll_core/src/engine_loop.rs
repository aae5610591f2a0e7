// crates/ragdoll_core/src/engine_loop.rs

use std::time::Instant;

pub const DEFAULT_MAX_FRAME_DT: f32 = 0.25;

/// Wall-clock frame timer. Deltas are clamped so a stalled frame (window
/// drag, breakpoint) does not fling the actor across the scene.
pub struct FrameClock {
    last_frame_time: Instant,
    max_frame_dt: f32,
    elapsed: f64,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_frame_dt: f32) -> Self {
        Self {
            last_frame_time: Instant::now(),
            max_frame_dt,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Update the frame timer and return the clamped frame delta.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let frame_dt = now
            .saturating_duration_since(self.last_frame_time)
            .as_secs_f32()
            .min(self.max_frame_dt);
        self.last_frame_time = now;
        self.elapsed += f64::from(frame_dt);
        self.frames += 1;
        frame_dt
    }

    /// Sum of clamped deltas handed out so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn long_frames_are_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::new(0.25);
        clock.last_frame_time = start;

        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);
        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), 0.25);
        assert_eq!(clock.frames(), 2);
        assert!((clock.elapsed() - 0.266).abs() < 1e-4);
    }

    #[test]
    fn clock_going_backwards_yields_zero() {
        let start = Instant::now();
        let mut clock = FrameClock::new(0.25);
        clock.last_frame_time = start + Duration::from_secs(1);
        assert_eq!(clock.tick_at(start), 0.0);
    }
}
