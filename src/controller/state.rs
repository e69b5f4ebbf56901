//! Controller state machine
//!
//! Pure state transitions for the speed controller. Nothing here touches
//! media, the overlay or storage.

use serde::{Deserialize, Serialize};

use crate::speed::{SpeedBounds, DEFAULT_SPEED};

/// Speed and enablement for the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    /// Speed chosen for the site
    pub current_speed: f64,

    /// Speed to restore on the next reset toggle
    pub last_speed: f64,

    /// Whether the controller is active on this site
    pub enabled_for_site: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl ControllerState {
    /// Create an enabled state at `speed`
    pub fn new(speed: f64) -> Self {
        Self {
            current_speed: speed,
            last_speed: speed,
            enabled_for_site: true,
        }
    }

    /// Rate media should actually play at
    pub fn effective_speed(&self) -> f64 {
        if self.enabled_for_site {
            self.current_speed
        } else {
            DEFAULT_SPEED
        }
    }

    /// Step the speed up, saturating at the upper bound
    pub fn increase(&mut self, bounds: &SpeedBounds) {
        self.current_speed = bounds.step_up(self.current_speed);
    }

    /// Step the speed down, saturating at the lower bound
    pub fn decrease(&mut self, bounds: &SpeedBounds) {
        self.current_speed = bounds.step_down(self.current_speed);
    }

    /// Toggle between normal speed and the last non-normal speed
    pub fn reset_toggle(&mut self, bounds: &SpeedBounds) {
        let normal = bounds.default_speed();

        if self.current_speed == normal && self.last_speed != normal {
            self.current_speed = self.last_speed;
        } else {
            self.last_speed = self.current_speed;
            self.current_speed = normal;
        }
    }

    /// Go inert: normal speed, commands ignored
    pub fn disable(&mut self) {
        self.enabled_for_site = false;
        self.current_speed = DEFAULT_SPEED;
    }

    /// Become active at `speed`
    pub fn enable_at(&mut self, speed: f64) {
        self.enabled_for_site = true;
        self.current_speed = speed;
    }

    /// Run a user speed command if enabled for the site
    ///
    /// Returns whether `change` ran. Disabled state is left untouched.
    pub fn apply_manual<F>(&mut self, change: F) -> bool
    where
        F: FnOnce(&mut Self),
    {
        if !self.enabled_for_site {
            return false;
        }
        change(self);
        true
    }

    /// Status snapshot as reported to UI peers
    pub fn status(&self) -> SpeedStatus {
        SpeedStatus {
            current_speed: self.current_speed,
            enabled_for_site: self.enabled_for_site,
        }
    }
}

/// Status reply sent to UI peers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedStatus {
    /// Current speed
    #[serde(rename = "currentSpeed")]
    pub current_speed: f64,

    /// Whether the controller is active on this site
    #[serde(rename = "isEnabledForSite")]
    pub enabled_for_site: bool,
}
