//! Transient speed overlay
//!
//! Shows the new speed in a small fixed-position box after every manual
//! speed change. Only one overlay is live at a time: showing a new one
//! cancels the previous removal timer and unmounts the previous node first.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::page::{OverlayId, OverlaySurface};
use crate::speed::format_speed;

/// Overlay appearance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Distance from the top of the viewport in pixels
    pub top_px: u32,
    /// Distance from the left of the viewport in pixels
    pub left_px: u32,
    /// CSS background
    pub background: String,
    /// CSS text color
    pub color: String,
    /// CSS padding
    pub padding: String,
    /// Font size in pixels
    pub font_size_px: u32,
    /// CSS font weight
    pub font_weight: String,
    /// Corner radius in pixels
    pub border_radius_px: u32,
    /// Stacking order
    pub z_index: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            top_px: 80,
            left_px: 50,
            background: "rgba(0, 0, 0, 0.7)".into(),
            color: "white".into(),
            padding: "12px 18px".into(),
            font_size_px: 24,
            font_weight: "bold".into(),
            border_radius_px: 8,
            z_index: 9999,
        }
    }
}

impl OverlayStyle {
    /// Render as an inline `style` attribute
    pub fn to_css(&self) -> String {
        format!(
            "position: fixed; top: {}px; left: {}px; background: {}; color: {}; \
             padding: {}; font-size: {}px; font-weight: {}; border-radius: {}px; z-index: {};",
            self.top_px,
            self.left_px,
            self.background,
            self.color,
            self.padding,
            self.font_size_px,
            self.font_weight,
            self.border_radius_px,
            self.z_index,
        )
    }
}

struct LiveOverlay {
    id: OverlayId,
    removal: JoinHandle<()>,
}

/// Speed overlay owner
///
/// Must be used from within a tokio runtime; removal is a spawned timer.
pub struct Overlay {
    surface: Arc<dyn OverlaySurface>,
    style: OverlayStyle,
    duration: Duration,
    live: Arc<Mutex<Option<LiveOverlay>>>,
}

impl Overlay {
    /// Create an overlay drawing onto `surface`
    pub fn new(surface: Arc<dyn OverlaySurface>, style: OverlayStyle, duration: Duration) -> Self {
        Self {
            surface,
            style,
            duration,
            live: Arc::new(Mutex::new(None)),
        }
    }

    /// Show `speed`, replacing any overlay still on screen
    pub fn show(&self, speed: f64) -> OverlayId {
        let mut live = self.live.lock();

        if let Some(previous) = live.take() {
            previous.removal.abort();
            if self.surface.is_mounted(previous.id) {
                self.surface.unmount(previous.id);
            }
        }

        let id = self.surface.mount(&format_speed(speed), &self.style);

        let surface = Arc::clone(&self.surface);
        let slot = Arc::clone(&self.live);
        let duration = self.duration;
        let removal = tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            {
                let mut live = slot.lock();
                if live.as_ref().is_some_and(|l| l.id == id) {
                    live.take();
                }
            }
            if surface.is_mounted(id) {
                surface.unmount(id);
            }
        });

        *live = Some(LiveOverlay { id, removal });
        id
    }

    /// Remove the live overlay now, if any
    pub fn dismiss(&self) {
        if let Some(previous) = self.live.lock().take() {
            previous.removal.abort();
            if self.surface.is_mounted(previous.id) {
                self.surface.unmount(previous.id);
            }
        }
    }

    /// Check whether an overlay is currently on screen
    pub fn is_visible(&self) -> bool {
        self.live
            .lock()
            .as_ref()
            .is_some_and(|l| self.surface.is_mounted(l.id))
    }
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("duration", &self.duration)
            .field("visible", &self.is_visible())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::SimOverlaySurface;

    fn overlay() -> (Arc<SimOverlaySurface>, Overlay) {
        let surface = Arc::new(SimOverlaySurface::new());
        let overlay = Overlay::new(
            surface.clone(),
            OverlayStyle::default(),
            Duration::from_millis(1500),
        );
        (surface, overlay)
    }

    #[test]
    fn test_default_style_css() {
        let css = OverlayStyle::default().to_css();
        assert!(css.starts_with("position: fixed; top: 80px; left: 50px;"));
        assert!(css.contains("background: rgba(0, 0, 0, 0.7);"));
        assert!(css.contains("z-index: 9999;"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_formats_speed() {
        let (surface, overlay) = overlay();

        overlay.show(1.5);

        let mounted = surface.mounted();
        assert_eq!(mounted.len(), 1);
        assert_eq!(mounted[0].text, "1.50x");
        assert!(overlay.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_after_duration() {
        let (surface, overlay) = overlay();

        overlay.show(2.0);
        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert!(overlay.is_visible());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!overlay.is_visible());
        assert!(surface.mounted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_show_supersedes_previous() {
        let (surface, overlay) = overlay();

        overlay.show(1.25);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        overlay.show(1.5);

        let mounted = surface.mounted();
        assert_eq!(mounted.len(), 1);
        assert_eq!(mounted[0].text, "1.50x");

        // The first timer was cancelled: the second overlay gets its full duration
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(overlay.is_visible());

        tokio::time::sleep(Duration::from_millis(501)).await;
        assert!(surface.mounted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss() {
        let (surface, overlay) = overlay();

        overlay.show(3.0);
        overlay.dismiss();

        assert!(!overlay.is_visible());
        assert!(surface.mounted().is_empty());
        assert_eq!(surface.history(), vec!["3.00x"]);
    }
}
