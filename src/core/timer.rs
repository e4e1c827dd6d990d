//! # Fixed Timestep Timer
//!
//! Splits wall-clock time into whole simulation ticks and a leftover fraction used to
//! interpolate rendering between ticks. Also counts frames for the FPS readout.

/// Upper bound on ticks run in a single frame; time beyond it is dropped.
pub const MAX_TICKS_PER_FRAME: u32 = 10;

/// Converts elapsed time into fixed-rate ticks.
///
/// Times are seconds from any fixed origin, usually the start of the program.
///
/// # Examples
///
/// ```
/// use voxel_client::core::timer::Timer;
///
/// let mut timer = Timer::new(20.0, 0.0);
/// assert_eq!(timer.advance(0.125), 2);
/// assert!((timer.partial_tick() - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Timer {
    ticks_per_second: f64,
    last_time: f64,
    partial_tick: f64,
    frames: u32,
    fps_window_start: f64,
    fps: u32,
}

impl Timer {
    /// Creates a timer running at `ticks_per_second`, starting at time `now`.
    pub fn new(ticks_per_second: f64, now: f64) -> Self {
        Self {
            ticks_per_second,
            last_time: now,
            partial_tick: 0.0,
            frames: 0,
            fps_window_start: now,
            fps: 0,
        }
    }

    /// Advances the clock to `now` and returns how many ticks should run.
    ///
    /// At most `MAX_TICKS_PER_FRAME` ticks are returned. A clock that steps backwards
    /// counts as no time passing.
    pub fn advance(&mut self, now: f64) -> u32 {
        let elapsed = (now - self.last_time).max(0.0);
        self.last_time = now;

        let passed = elapsed * self.ticks_per_second + self.partial_tick;
        let ticks = passed.floor();
        self.partial_tick = passed - ticks;

        let ticks = ticks as u64;
        if ticks > u64::from(MAX_TICKS_PER_FRAME) {
            log::debug!(
                "Running behind, skipping {} ticks",
                ticks - u64::from(MAX_TICKS_PER_FRAME)
            );
            MAX_TICKS_PER_FRAME
        } else {
            ticks as u32
        }
    }

    /// Progress towards the next tick, in `[0, 1)`.
    pub fn partial_tick(&self) -> f64 {
        self.partial_tick
    }

    /// Records a rendered frame.
    ///
    /// # Returns
    /// The frame rate over the last second, once per second.
    pub fn count_frame(&mut self, now: f64) -> Option<u32> {
        self.frames += 1;
        if now - self.fps_window_start < 1.0 {
            return None;
        }
        self.fps = self.frames;
        self.frames = 0;
        self.fps_window_start = now;
        log::debug!("{} fps", self.fps);
        Some(self.fps)
    }

    /// The most recently measured frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_accumulate_into_ticks() {
        let mut timer = Timer::new(20.0, 0.0);
        assert_eq!(timer.advance(0.03), 0);
        assert!((timer.partial_tick() - 0.6).abs() < 1e-9);
        assert_eq!(timer.advance(0.06), 1);
        assert!((timer.partial_tick() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn catch_up_is_capped() {
        let mut timer = Timer::new(20.0, 0.0);
        assert_eq!(timer.advance(60.0), MAX_TICKS_PER_FRAME);
        assert_eq!(timer.advance(60.125), 2);
    }

    #[test]
    fn backwards_clock_is_ignored() {
        let mut timer = Timer::new(20.0, 5.0);
        assert_eq!(timer.advance(4.0), 0);
        assert_eq!(timer.partial_tick(), 0.0);
    }

    #[test]
    fn partial_tick_stays_below_one() {
        let mut timer = Timer::new(20.0, 0.0);
        let mut now = 0.0;
        for _ in 0..1000 {
            now += fastrand::f64() * 0.2;
            timer.advance(now);
            assert!((0.0..1.0).contains(&timer.partial_tick()));
        }
    }

    #[test]
    fn fps_is_reported_once_per_second() {
        let mut timer = Timer::new(20.0, 0.0);
        for frame in 1..60 {
            assert_eq!(timer.count_frame(f64::from(frame) / 60.0), None);
        }
        assert_eq!(timer.count_frame(1.0), Some(60));
        assert_eq!(timer.fps(), 60);
        assert_eq!(timer.count_frame(1.01), None);
    }
}
