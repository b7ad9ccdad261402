//! Constant-rate value ramp.
//!
//! [`LinearRamp`] walks from its current value to a new target in equal
//! steps and lands on the target exactly. The step count comes from the
//! ramp duration and the sample rate; a zero duration makes every change a
//! step change.
//!
//! ```rust
//! use ojd_core::LinearRamp;
//!
//! let mut ramp = LinearRamp::new(1.0);
//! ramp.set_sample_rate(48000.0);
//! ramp.set_duration_ms(10.0);
//! ramp.set_target(0.5);
//!
//! for _ in 0..480 {
//!     ramp.tick();
//! }
//! assert_eq!(ramp.value(), 0.5);
//! ```

/// A value that moves linearly towards its target, one step per sample.
#[derive(Debug, Clone)]
pub struct LinearRamp {
    value: f32,
    target: f32,
    step: f32,
    steps_left: u32,
    sample_rate: f32,
    duration_ms: f32,
}

impl LinearRamp {
    /// A settled ramp at `value` with zero duration.
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            step: 0.0,
            steps_left: 0,
            sample_rate: 48000.0,
            duration_ms: 0.0,
        }
    }

    /// Starts a ramp towards `target`.
    ///
    /// Re-setting the current target leaves a running ramp alone.
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;

        let steps = (self.duration_ms * 0.001 * self.sample_rate).max(0.0) as u32;
        if steps == 0 {
            self.finish();
        } else {
            self.step = (target - self.value) / steps as f32;
            self.steps_left = steps;
        }
    }

    /// Sample rate used for the next ramp.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Duration of the next ramp in milliseconds.
    pub fn set_duration_ms(&mut self, duration_ms: f32) {
        self.duration_ms = duration_ms;
    }

    /// Ramp duration in milliseconds.
    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Advances one sample and returns the new value.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        match self.steps_left {
            0 => {}
            1 => self.finish(),
            _ => {
                self.value += self.step;
                self.steps_left -= 1;
            }
        }
        self.value
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value the ramp is heading for.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Returns `true` once the target has been reached.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.steps_left == 0
    }

    /// Jumps to the target.
    pub fn finish(&mut self) {
        self.value = self.target;
        self.step = 0.0;
        self.steps_left = 0;
    }
}

impl Default for LinearRamp {
    fn default() -> Self {
        Self::new(0.0)
    }
}
