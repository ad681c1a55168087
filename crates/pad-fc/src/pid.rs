use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PidGains {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

impl PidGains {
    pub const fn new(p: f64, i: f64, d: f64) -> Self {
        Self { p, i, d }
    }
}

/// Single-axis PID loop on `setpoint - measurement`.
///
/// Output is unbounded; clamp at the call site.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    setpoint: f64,
    integral: f64,
    prev_error: f64,
    prev_time: f64,
}

impl Pid {
    /// `time` is the reference the first `evaluate` measures `dt` from.
    pub fn new(gains: PidGains, setpoint: f64, time: f64) -> Self {
        Self {
            gains,
            setpoint,
            integral: 0.0,
            prev_error: 0.0,
            prev_time: time,
        }
    }

    pub fn evaluate(&mut self, measurement: f64, time: f64) -> f64 {
        let error = self.setpoint - measurement;
        let dt = time - self.prev_time;
        // same or earlier timestamp: no I/D this call, state untouched
        if dt <= 0.0 || !dt.is_finite() {
            return self.gains.p * error;
        }

        self.integral += error * dt;
        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;
        self.prev_time = time;

        self.gains.p * error + self.gains.i * self.integral + self.gains.d * derivative
    }

    pub fn reset(&mut self, time: f64) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.prev_time = time;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}
