//! Playback speed bounds and formatting

/// Slowest speed a user can step down to
pub const MIN_SPEED: f64 = 0.25;

/// Fastest speed a user can step up to
pub const MAX_SPEED: f64 = 5.0;

/// Increment applied by a single increase/decrease command
pub const SPEED_STEP: f64 = 0.25;

/// Normal playback speed
pub const DEFAULT_SPEED: f64 = 1.0;

/// Lowest rate media elements accept
pub const MIN_PLAYBACK_RATE: f64 = 0.0625;

/// Highest rate media elements accept
pub const MAX_PLAYBACK_RATE: f64 = 16.0;

/// Range and step size for user-adjustable speeds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBounds {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
    /// Step size for increase/decrease
    pub step: f64,
}

impl Default for SpeedBounds {
    fn default() -> Self {
        Self {
            min: MIN_SPEED,
            max: MAX_SPEED,
            step: SPEED_STEP,
        }
    }
}

impl SpeedBounds {
    /// Create bounds, forcing them into the range media elements accept
    ///
    /// A non-positive or non-finite step falls back to [`SPEED_STEP`].
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        let min = sanitize(min, MIN_SPEED).clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        let max = sanitize(max, MAX_SPEED).clamp(min, MAX_PLAYBACK_RATE);
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            SPEED_STEP
        };

        Self { min, max, step }
    }

    /// Clamp a speed into range. Non-finite input maps to the default speed.
    pub fn clamp(&self, speed: f64) -> f64 {
        sanitize(speed, DEFAULT_SPEED).clamp(self.min, self.max)
    }

    /// One step faster, saturating at `max`
    pub fn step_up(&self, speed: f64) -> f64 {
        (speed + self.step).min(self.max)
    }

    /// One step slower, saturating at `min`
    pub fn step_down(&self, speed: f64) -> f64 {
        (speed - self.step).max(self.min)
    }

    /// Normal speed, clamped into range
    pub fn default_speed(&self) -> f64 {
        self.clamp(DEFAULT_SPEED)
    }

    /// Check whether a speed lies within the bounds
    pub fn contains(&self, speed: f64) -> bool {
        speed >= self.min && speed <= self.max
    }
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Render a speed the way the overlay shows it, e.g. `1.25x`
pub fn format_speed(speed: f64) -> String {
    format!("{:.2}x", speed)
}
