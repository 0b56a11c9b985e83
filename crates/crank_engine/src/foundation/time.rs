//! Time management utilities

use std::time::Instant;

/// Wall-clock timer measuring the time between frames
pub struct Timer {
    last_frame: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
        }
    }

    /// Update the timer (should be called once per frame) and return the
    /// seconds elapsed since the previous update
    pub fn update(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        elapsed.as_secs_f64()
    }
}

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

fn to_nanos(seconds: f64) -> u64 {
    (seconds.max(0.0) * NANOS_PER_SEC).round() as u64
}

/// Accumulates variable frame deltas into whole fixed-size ticks.
///
/// Time is counted in whole nanoseconds so deltas that add up to a number of
/// ticks produce exactly that many ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f64,
    step_nanos: u64,
    accumulator: u64,
}

impl FixedTimestep {
    /// Create an accumulator for ticks of `step` seconds
    pub fn new(step: f64) -> Self {
        Self {
            step,
            step_nanos: to_nanos(step),
            accumulator: 0,
        }
    }

    /// Duration of one tick in seconds
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Time carried over that does not yet add up to a full tick
    pub fn accumulator(&self) -> f64 {
        self.accumulator as f64 / NANOS_PER_SEC
    }

    /// Add a frame delta to the accumulator; negative deltas are ignored
    pub fn accumulate(&mut self, delta_time: f64) {
        self.accumulator = self.accumulator.saturating_add(to_nanos(delta_time));
    }

    /// Consume one tick if a full tick is available.
    ///
    /// A remainder equal to the step counts as a full tick.
    pub fn consume_tick(&mut self) -> bool {
        if self.step_nanos > 0 && self.accumulator >= self.step_nanos {
            self.accumulator -= self.step_nanos;
            true
        } else {
            false
        }
    }
}

/// Gates rendering to a target frame rate and measures the rendered FPS
#[derive(Debug, Clone)]
pub struct FramePacer {
    target_frame_time: Option<f64>,
    since_last_render: f64,
    fps: f64,
}

impl FramePacer {
    /// Create a pacer; `None` renders every frame
    pub fn new(target_frame_rate: Option<f64>) -> Self {
        Self {
            target_frame_time: Self::frame_time(target_frame_rate),
            since_last_render: 0.0,
            fps: 0.0,
        }
    }

    fn frame_time(target_frame_rate: Option<f64>) -> Option<f64> {
        target_frame_rate.filter(|rate| *rate > 0.0).map(|rate| 1.0 / rate)
    }

    /// Change the target frame rate
    pub fn set_target_frame_rate(&mut self, target_frame_rate: Option<f64>) {
        self.target_frame_time = Self::frame_time(target_frame_rate);
    }

    /// Target frame rate, if capped
    pub fn target_frame_rate(&self) -> Option<f64> {
        self.target_frame_time.map(|time| 1.0 / time)
    }

    /// Account for `delta_time` and report whether a frame should be rendered
    pub fn should_render(&mut self, delta_time: f64) -> bool {
        self.since_last_render += delta_time;

        let ready = match self.target_frame_time {
            Some(frame_time) => self.since_last_render >= frame_time,
            None => true,
        };

        if ready {
            if self.since_last_render > 0.0 {
                self.fps = 1.0 / self.since_last_render;
            }
            self.since_last_render = 0.0;
        }

        ready
    }

    /// Frames per second measured between the last two rendered frames
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_timestep_counts_whole_ticks() {
        let mut timestep = FixedTimestep::new(0.25);
        let mut ticks = 0;

        for delta in [0.1, 0.3, 0.5, 0.125, 0.0625] {
            timestep.accumulate(delta);
            while timestep.consume_tick() {
                ticks += 1;
            }
        }

        // 1.0875 seconds = 4 ticks + 0.0875
        assert_eq!(ticks, 4);
        assert_relative_eq!(timestep.accumulator(), 0.0875, epsilon = 1e-9);
    }

    #[test]
    fn test_fixed_timestep_exact_multiple_leaves_no_remainder() {
        let mut timestep = FixedTimestep::new(0.125);
        timestep.accumulate(0.5);

        let mut ticks = 0;
        while timestep.consume_tick() {
            ticks += 1;
        }

        assert_eq!(ticks, 4);
        assert_relative_eq!(timestep.accumulator(), 0.0);
    }

    #[test]
    fn test_decimal_deltas_produce_exact_tick_counts() {
        fn ticks_for(step: f64, delta: f64, frames: usize) -> (usize, f64) {
            let mut timestep = FixedTimestep::new(step);
            let mut ticks = 0;
            for _ in 0..frames {
                timestep.accumulate(delta);
                while timestep.consume_tick() {
                    ticks += 1;
                }
            }
            (ticks, timestep.accumulator())
        }

        assert_eq!(ticks_for(0.02, 0.1, 3), (15, 0.0));
        assert_eq!(ticks_for(0.02, 0.1, 10), (50, 0.0));
        assert_eq!(ticks_for(0.02, 0.06, 10), (30, 0.0));
        assert_eq!(ticks_for(0.02, 0.03, 20), (30, 0.0));

        let (ticks, remainder) = ticks_for(0.02, 0.05, 3);
        assert_eq!(ticks, 7);
        assert_relative_eq!(remainder, 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut timestep = FixedTimestep::new(0.25);
        timestep.accumulate(0.125);
        timestep.accumulate(-1.0);
        assert_relative_eq!(timestep.accumulator(), 0.125);
    }

    #[test]
    fn test_zero_step_never_ticks() {
        let mut timestep = FixedTimestep::new(0.0);
        timestep.accumulate(1.0);
        assert!(!timestep.consume_tick());
    }

    #[test]
    fn test_frame_pacer_caps_rendering() {
        let mut pacer = FramePacer::new(Some(10.0));

        assert!(!pacer.should_render(0.05));
        assert!(pacer.should_render(0.05));
        assert_relative_eq!(pacer.fps(), 10.0, epsilon = 1e-9);
        assert!(!pacer.should_render(0.02));
    }

    #[test]
    fn test_uncapped_pacer_renders_every_frame() {
        let mut pacer = FramePacer::new(None);

        assert!(pacer.should_render(0.004));
        assert!(pacer.should_render(0.004));
        assert_relative_eq!(pacer.fps(), 250.0, epsilon = 1e-9);
        assert_eq!(pacer.target_frame_rate(), None);
    }
}
