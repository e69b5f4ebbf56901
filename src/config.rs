//! Controller configuration

use std::time::Duration;

use crate::overlay::OverlayStyle;
use crate::speed::SpeedBounds;

/// Controller configuration options
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Speed range and step size
    pub bounds: SpeedBounds,

    /// How long the speed overlay stays on screen
    pub overlay_duration: Duration,

    /// Quiet window for re-applying speed after DOM mutations
    pub debounce_window: Duration,

    /// Overlay appearance
    pub overlay_style: OverlayStyle,

    /// Capacity of the message endpoint's request queue
    pub message_queue_size: usize,

    /// Capacity of the mutation feed
    pub mutation_queue_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            bounds: SpeedBounds::default(),
            overlay_duration: Duration::from_millis(1500),
            debounce_window: Duration::from_millis(200),
            overlay_style: OverlayStyle::default(),
            message_queue_size: 64,
            mutation_queue_size: 256,
        }
    }
}

impl ControllerConfig {
    /// Set the speed range, keeping the current step
    pub fn speed_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = SpeedBounds::new(min, max, self.bounds.step);
        self
    }

    /// Set the increase/decrease step
    pub fn speed_step(mut self, step: f64) -> Self {
        self.bounds = SpeedBounds::new(self.bounds.min, self.bounds.max, step);
        self
    }

    /// Set how long the overlay stays visible
    pub fn overlay_duration(mut self, duration: Duration) -> Self {
        self.overlay_duration = duration;
        self
    }

    /// Set the mutation debounce window
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Set the overlay style
    pub fn overlay_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    /// Set the request queue capacity (at least 1)
    pub fn message_queue_size(mut self, size: usize) -> Self {
        self.message_queue_size = size.max(1);
        self
    }

    /// Set the mutation feed capacity (at least 1)
    pub fn mutation_queue_size(mut self, size: usize) -> Self {
        self.mutation_queue_size = size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speed::{MAX_PLAYBACK_RATE, SPEED_STEP};

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();

        assert_eq!(config.bounds, SpeedBounds::default());
        assert_eq!(config.overlay_duration, Duration::from_millis(1500));
        assert_eq!(config.debounce_window, Duration::from_millis(200));
        assert_eq!(config.message_queue_size, 64);
    }

    #[test]
    fn test_builder_speed_bounds() {
        let config = ControllerConfig::default().speed_bounds(0.5, 3.0);

        assert_eq!(config.bounds.min, 0.5);
        assert_eq!(config.bounds.max, 3.0);
        assert_eq!(config.bounds.step, SPEED_STEP);
    }

    #[test]
    fn test_builder_speed_bounds_capped() {
        // Max is capped at what media elements accept
        let config = ControllerConfig::default().speed_bounds(0.25, 100.0);

        assert_eq!(config.bounds.max, MAX_PLAYBACK_RATE);
    }

    #[test]
    fn test_builder_queue_sizes_floor() {
        let config = ControllerConfig::default()
            .message_queue_size(0)
            .mutation_queue_size(0);

        assert_eq!(config.message_queue_size, 1);
        assert_eq!(config.mutation_queue_size, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ControllerConfig::default()
            .speed_step(0.1)
            .overlay_duration(Duration::from_secs(3))
            .debounce_window(Duration::from_millis(50));

        assert_eq!(config.bounds.step, 0.1);
        assert_eq!(config.overlay_duration, Duration::from_secs(3));
        assert_eq!(config.debounce_window, Duration::from_millis(50));
    }
}
