//! Text measurement for layout.

use crate::geometry::Point;
use std::fmt::Debug;

/// Measures rendered text.
pub trait TextMeasurer: Debug + Send + Sync {
    /// Width and height of `text` (lines split at `\n`) at `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> Point;
}

/// Fixed-advance estimate: 0.6 em per character, 1 em per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextMeasurer;

impl HeuristicTextMeasurer {
    const CHAR_WIDTH_EM: f64 = 0.6;
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> Point {
        if text.is_empty() {
            return Point::ORIGIN;
        }
        let lines = text.split('\n');
        let (count, longest) = lines.fold((0usize, 0usize), |(n, w), l| (n + 1, w.max(l.chars().count())));
        Point::new(longest as f64 * Self::CHAR_WIDTH_EM * font_size, count as f64 * font_size)
    }
}
