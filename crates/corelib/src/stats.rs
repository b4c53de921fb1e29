/// Frames-per-second over a sliding half-second window.
#[derive(Clone, Copy, Debug)]
pub struct FrameStats {
    window: f32,
    elapsed: f32,
    frames: u32,
    fps: Option<f32>,
}

impl FrameStats {
    pub fn new(window_secs: f32) -> Self {
        Self {
            window: window_secs.max(f32::EPSILON),
            elapsed: 0.0,
            frames: 0,
            fps: None,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        self.frames += 1;
        if self.elapsed >= self.window {
            self.fps = Some(self.frames as f32 / self.elapsed);
            self.elapsed = 0.0;
            self.frames = 0;
        }
    }

    /// `None` until the first window has completed.
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_after_first_window() {
        let mut stats = FrameStats::default();
        for _ in 0..31 {
            stats.tick(1.0 / 64.0);
        }
        assert_eq!(stats.fps(), None);
        stats.tick(1.0 / 64.0);
        assert_eq!(stats.fps(), Some(64.0));
    }
}
