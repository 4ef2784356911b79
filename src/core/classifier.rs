//! Dominant color classification over the camera's lower-center band

use crate::types::{CameraFrame, ColorVerdict};
use crate::DOMINANCE_FACTOR;

/// Summed channel intensities over the sample region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelSums {
    pub red: u64,
    pub green: u64,
    pub blue: u64,
}

/// Classifies a frame as RED, GREEN, BLUE or NONE
#[derive(Debug)]
pub struct ColorClassifier {
    dominance_factor: u64,
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorClassifier {
    pub fn new() -> Self {
        Self { dominance_factor: DOMINANCE_FACTOR }
    }

    pub fn with_dominance_factor(dominance_factor: u64) -> Self {
        Self { dominance_factor }
    }

    /// Columns width/3..2*width/3, rows height/2..3*height/4
    pub fn sample_region(width: usize, height: usize) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        (width / 3..2 * width / 3, height / 2..3 * height / 4)
    }

    pub fn channel_sums(&self, frame: &CameraFrame) -> ChannelSums {
        let (xs, ys) = Self::sample_region(frame.width(), frame.height());
        let mut sums = ChannelSums::default();
        for x in xs {
            for y in ys.clone() {
                sums.red += frame.red(x, y) as u64;
                sums.green += frame.green(x, y) as u64;
                sums.blue += frame.blue(x, y) as u64;
            }
        }
        sums
    }

    pub fn classify(&self, frame: &CameraFrame) -> ColorVerdict {
        self.verdict(self.channel_sums(frame))
    }

    /// A channel wins only if it beats both others by the dominance factor.
    /// Products saturate, so a huge factor can only make a win harder.
    pub fn verdict(&self, sums: ChannelSums) -> ColorVerdict {
        let k = self.dominance_factor;
        let beats = |a: u64, b: u64| a > k.saturating_mul(b);
        let ChannelSums { red, green, blue } = sums;
        if beats(red, green) && beats(red, blue) {
            ColorVerdict::Red
        } else if beats(green, red) && beats(green, blue) {
            ColorVerdict::Green
        } else if beats(blue, red) && beats(blue, green) {
            ColorVerdict::Blue
        } else {
            ColorVerdict::None
        }
    }
}
