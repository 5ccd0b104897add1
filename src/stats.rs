use std::time::{Duration, Instant};

/// Frames-per-second counter in the style of a stats overlay widget.
///
/// Call [`FrameStats::frame_completed`] once per rendered frame; roughly once
/// a second it folds the accumulated count into a fresh FPS reading.
#[derive(Debug)]
pub struct FrameStats {
    frames: u32,
    window_start: Instant,
    fps: Option<f32>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: None,
        }
    }

    /// Notifies the counter that a frame finished. Returns a new FPS reading
    /// when a measurement window has elapsed.
    pub fn frame_completed(&mut self) -> Option<f32> {
        self.frame_completed_at(Instant::now())
    }

    fn frame_completed_at(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        self.fps = Some(fps);
        Some(fps)
    }

    /// Most recent reading, if a full window has elapsed yet.
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }

    /// Short text for a window-title overlay.
    pub fn overlay(&self) -> String {
        match self.fps {
            Some(fps) => format!("{fps:.0} FPS"),
            None => "-- FPS".to_string(),
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reading_before_a_full_window() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        for i in 1..=30 {
            let now = start + Duration::from_millis(i * 16);
            assert_eq!(stats.frame_completed_at(now), None);
        }
        assert_eq!(stats.fps(), None);
        assert_eq!(stats.overlay(), "-- FPS");
    }

    #[test]
    fn sixty_frames_in_a_second_reads_sixty() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        let mut reading = None;
        for i in 1..=60 {
            let now = start + Duration::from_millis(i * 1000 / 60);
            if let Some(fps) = stats.frame_completed_at(now) {
                reading = Some(fps);
            }
        }
        let fps = reading.expect("one window should have closed");
        assert!((fps - 60.0).abs() < 2.0, "fps was {fps}");
        assert!(stats.overlay().ends_with("FPS"));
    }

    #[test]
    fn counter_resets_between_windows() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        stats.frame_completed_at(start + Duration::from_secs(2));
        // next window starts fresh
        assert_eq!(
            stats.frame_completed_at(start + Duration::from_millis(2500)),
            None
        );
        let second = stats
            .frame_completed_at(start + Duration::from_secs(4))
            .expect("window closed");
        assert!(second > 0.0);
    }
}
