use crate::player::PlaybackMetrics;

pub const VIS_BARS: usize = 20;

// Bars never drop below 20% so the meter stays visible at low volume.
const VIS_FLOOR: f32 = 20.0;
const VIS_CEIL: f32 = 100.0;

// How much recent signal feeds one frame.
const FRAME_WINDOW: usize = 1024;

/// Fixed 20-bar amplitude histogram over the live sample tap. Purely
/// observational: when the tap has nothing to offer the meter degrades
/// to the flat floor pattern and playback is unaffected.
pub struct VisualizerSampler {
    bars: [f32; VIS_BARS],
}

impl VisualizerSampler {
    pub fn new() -> Self {
        VisualizerSampler {
            bars: [VIS_FLOOR; VIS_BARS],
        }
    }

    /// Called once per render frame. Nothing is scheduled between
    /// frames, so stopping playback stops the sampling with it.
    pub fn sample(&mut self, metrics: &PlaybackMetrics) -> [f32; VIS_BARS] {
        if !metrics.is_playing() {
            self.bars = [VIS_FLOOR; VIS_BARS];
            return self.bars;
        }

        let samples = metrics.latest_samples(FRAME_WINDOW);
        if samples.is_empty() {
            return self.bars;
        }

        let chunk = (samples.len() / VIS_BARS).max(1);
        for (i, bar) in self.bars.iter_mut().enumerate() {
            let start = i * chunk;
            if start >= samples.len() {
                *bar = VIS_FLOOR;
                continue;
            }
            let end = (start + chunk).min(samples.len());
            let peak = samples[start..end]
                .iter()
                .fold(0.0f32, |acc, s| acc.max(s.abs()));

            *bar = (peak * 100.0).clamp(VIS_FLOOR, VIS_CEIL);
        }

        self.bars
    }
}

impl Default for VisualizerSampler {
    fn default() -> Self {
        Self::new()
    }
}
