use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Fixed-step frame clock. The runtime's motion constants are tuned per
/// 60 Hz step, so simulation always advances in `fixed_dt` slices no matter
/// how fast frames arrive.
pub struct FrameClock {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    /// Simulated seconds since start; the runtime's notion of "now".
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.begin_frame_with(elapsed);
    }

    /// Start a frame with an explicit wall-clock delta.
    pub fn begin_frame_with(&mut self, elapsed: f64) {
        self.real_dt = elapsed.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_whole_steps() {
        let mut clock = FrameClock::new();
        clock.begin_frame_with(2.5 / 60.0);
        let mut steps = 0;
        while clock.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 2);
        assert_eq!(clock.steps_this_frame, 2);

        clock.begin_frame_with(0.5 / 60.0);
        assert!(clock.should_step());
        assert!(!clock.should_step());
        assert_eq!(clock.fixed_step_count, 3);
        assert!((clock.total_time - 3.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut clock = FrameClock::new();
        clock.begin_frame_with(5.0);
        assert_eq!(clock.real_dt, clock.max_accumulator);
        let mut steps = 0;
        while clock.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 15);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut clock = FrameClock::new();
        clock.begin_frame_with(-1.0);
        assert!(!clock.should_step());
        assert_eq!(clock.frame_count, 1);
    }
}
