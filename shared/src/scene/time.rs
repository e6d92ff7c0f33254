/// Time passed to every system callback of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameTime {
    /// Elapsed time in seconds, monotonic.
    pub t: f64,
    /// Seconds since the previous frame, never negative.
    pub dt: f64,
}

impl FrameTime {
    pub fn new(t: f64, dt: f64) -> Self {
        Self { t, dt }
    }

    /// Clamps externally supplied time so that `dt >= 0`, both are finite and
    /// `t` does not move backwards past `last_t`.
    pub fn sanitized(t: f64, dt: f64, last_t: f64) -> Self {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let t = if t.is_finite() && t >= last_t { t } else { last_t };
        Self { t, dt }
    }
}

/// Accumulates elapsed time from externally supplied deltas.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    elapsed: f64,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, dt: f64) -> FrameTime {
        let time = FrameTime::sanitized(self.elapsed + dt, dt, self.elapsed);
        self.elapsed = time.t;
        self.frames += 1;
        time
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
