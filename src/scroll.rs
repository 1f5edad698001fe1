// scroll.rs — scroll region → progress in [0, 1]

/// A scrollable region: how far the viewport has travelled through the content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRegion {
    pub offset: f32,
    pub content_height: f32,
    pub viewport_height: f32,
}

impl ScrollRegion {
    pub fn new(content_height: f32, viewport_height: f32) -> Self {
        Self {
            offset: 0.0,
            content_height,
            viewport_height,
        }
    }

    /// Distance that can actually be scrolled.
    pub fn scrollable(&self) -> f32 {
        self.content_height - self.viewport_height
    }

    /// Position through the region. A degenerate region reports 0.
    pub fn progress(&self) -> f32 {
        let scrollable = self.scrollable();
        if scrollable.is_nan() || scrollable <= 0.0 || !self.offset.is_finite() {
            return 0.0;
        }
        (self.offset / scrollable).clamp(0.0, 1.0)
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
        self.clamp_offset();
    }

    pub fn scroll_by(&mut self, delta: f32) {
        if delta.is_finite() {
            self.offset += delta;
            self.clamp_offset();
        }
    }

    /// Jumps so that `progress()` reports `progress`.
    pub fn scroll_to_progress(&mut self, progress: f32) {
        if progress.is_finite() {
            self.offset = progress.clamp(0.0, 1.0) * self.scrollable().max(0.0);
        }
    }

    pub fn scroll_to_start(&mut self) {
        self.offset = 0.0;
    }

    pub fn scroll_to_end(&mut self) {
        self.offset = self.scrollable().max(0.0);
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.clamp(0.0, self.scrollable().max(0.0));
    }
}

/// Sanitises an externally supplied progress value.
///
/// Non-finite values are rejected so the caller can keep the previous one.
pub fn sanitize_progress(progress: f32) -> Option<f32> {
    progress.is_finite().then(|| progress.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_basic() {
        let mut region = ScrollRegion::new(3000.0, 1000.0);
        assert_eq!(region.progress(), 0.0);
        region.scroll_by(500.0);
        assert_eq!(region.progress(), 0.25);
        region.scroll_by(1e9);
        assert_eq!(region.progress(), 1.0);
        region.scroll_by(-1e9);
        assert_eq!(region.progress(), 0.0);
    }

    #[test]
    fn test_degenerate_region_is_zero() {
        let mut region = ScrollRegion::new(800.0, 1000.0);
        region.offset = 50.0;
        assert_eq!(region.progress(), 0.0);
        let region = ScrollRegion::new(1000.0, 1000.0);
        assert_eq!(region.progress(), 0.0);
    }

    #[test]
    fn test_scroll_to_progress() {
        let mut region = ScrollRegion::new(2000.0, 1000.0);
        region.scroll_to_progress(0.5);
        assert_eq!(region.offset, 500.0);
        region.scroll_to_end();
        assert_eq!(region.progress(), 1.0);
        region.scroll_to_start();
        assert_eq!(region.progress(), 0.0);
    }

    #[test]
    fn test_sanitize_progress() {
        assert_eq!(sanitize_progress(f32::NAN), None);
        assert_eq!(sanitize_progress(1.7), Some(1.0));
        assert_eq!(sanitize_progress(-0.2), Some(0.0));
        assert_eq!(sanitize_progress(0.4), Some(0.4));
    }
}
