//! Continuous color legends.

use super::assembler::{baseline, legend_frame, title_size, with_breaks};
use super::layout::LegendBoxLayout;
use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::{Point, Rect, Span};
use crate::grammar::{AesValue, LegendTheme};
use crate::render::{SceneNode, Style, TextAnchor, TextMeasurer, TextNode};
use crate::scale::{GuideMapper, Scale, ScaleBreaks};

/// Gradient bins of a colorbar.
pub const DEF_NUM_BIN: usize = 20;

/// User overrides of a colorbar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorBarOptions {
    /// Bar width in pixels.
    pub width: Option<f64>,
    /// Bar height in pixels.
    pub height: Option<f64>,
    /// Gradient bins.
    pub bin_count: Option<usize>,
}

/// Builds a colorbar from a color scale and its mapper.
#[derive(Debug, Clone)]
pub struct ColorBarAssembler {
    title: String,
    transformed_domain: Span,
    scale: Scale,
    mapper: GuideMapper<AesValue>,
    theme: LegendTheme,
    options: ColorBarOptions,
}

impl ColorBarAssembler {
    /// Assembler for a colorbar over `transformed_domain`.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        transformed_domain: Span,
        scale: Scale,
        mapper: GuideMapper<AesValue>,
        theme: LegendTheme,
    ) -> Self {
        Self {
            title: title.into(),
            transformed_domain,
            scale,
            mapper,
            theme,
            options: ColorBarOptions::default(),
        }
    }

    /// Apply user overrides.
    #[must_use]
    pub fn options(mut self, options: ColorBarOptions) -> Self {
        self.options = options;
        self
    }

    /// Lay out the colorbar, `None` when the scale has no breaks to label.
    pub fn create_color_bar(&self, measurer: &dyn TextMeasurer) -> Result<Option<ColorBarSpec>> {
        let scale = with_breaks(&self.scale, Some(self.transformed_domain));
        let breaks = scale.scale_breaks();
        if breaks.is_empty() {
            log::debug!("colorbar '{}': no breaks", self.title);
            return Ok(None);
        }
        Ok(Some(ColorBarSpec::new(
            &self.title,
            self.transformed_domain,
            breaks.clone(),
            &self.mapper,
            &self.theme,
            self.options,
            measurer,
        )))
    }
}

/// A laid-out colorbar.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBarSpec {
    title: String,
    domain: Span,
    breaks: ScaleBreaks,
    bins: Vec<Rgba>,
    bar_size: Point,
    horizontal: bool,
    reverse: bool,
    label_height: f64,
    layout: LegendBoxLayout,
    theme: LegendTheme,
}

impl ColorBarSpec {
    /// Lay out a colorbar.
    ///
    /// The bar is the theme size unless `options` fix it. Without an explicit
    /// width a horizontal bar grows to fit every label side by side, and
    /// likewise for the height of a vertical bar.
    #[must_use]
    pub fn new(
        title: &str,
        domain: Span,
        breaks: ScaleBreaks,
        mapper: &GuideMapper<AesValue>,
        theme: &LegendTheme,
        options: ColorBarOptions,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let horizontal = theme.is_horizontal();
        let label_sizes: Vec<Point> =
            breaks.labels().iter().map(|l| measurer.measure(l, theme.text_font_size)).collect();
        let label_width = label_sizes.iter().map(|s| s.x).fold(0.0, f64::max);
        let label_height = label_sizes.iter().map(|s| s.y).fold(0.0, f64::max);
        let slots = (breaks.len() + 1) as f64;

        let mut bar_size = if horizontal {
            Point::new(theme.colorbar_length, theme.colorbar_thickness)
        } else {
            Point::new(theme.colorbar_thickness, theme.colorbar_length)
        };
        match options.width {
            Some(w) => bar_size.x = w,
            None if horizontal => bar_size.x = bar_size.x.max(label_width * slots),
            None => {}
        }
        match options.height {
            Some(h) => bar_size.y = h,
            None if !horizontal => bar_size.y = bar_size.y.max(label_height * slots),
            None => {}
        }

        let bin_count = options.bin_count.unwrap_or(DEF_NUM_BIN).max(1);
        let step = domain.length() / bin_count as f64;
        let bins = (0..bin_count)
            .map(|i| {
                let center = domain.lower() + step * (i as f64 + 0.5);
                mapper.map(Some(center)).as_color().unwrap_or(Rgba::TRANSPARENT)
            })
            .collect();

        let graph_size = if horizontal {
            Point::new(bar_size.x, bar_size.y + theme.label_padding + label_height)
        } else {
            Point::new(bar_size.x + theme.label_padding + label_width, bar_size.y)
        };
        let title_size = title_size(title, theme, measurer);

        Self {
            title: title.to_string(),
            domain,
            breaks,
            bins,
            bar_size,
            horizontal,
            reverse: !horizontal,
            label_height,
            layout: LegendBoxLayout::new(title_size, graph_size, horizontal, theme.title_font_size),
            theme: theme.clone(),
        }
    }

    /// Legend title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Labelled breaks.
    #[must_use]
    pub fn breaks(&self) -> &ScaleBreaks {
        &self.breaks
    }

    /// Bin colors from the low to the high end of the domain.
    #[must_use]
    pub fn bins(&self) -> &[Rgba] {
        &self.bins
    }

    /// Bar size in pixels.
    #[must_use]
    pub fn bar_size(&self) -> Point {
        self.bar_size
    }

    /// Whether the bar runs left to right.
    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.horizontal
    }

    /// Whether high values come first along the bar (top of a vertical bar).
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// Title and graph placement.
    #[must_use]
    pub fn layout(&self) -> &LegendBoxLayout {
        &self.layout
    }

    /// Size of the legend box.
    #[must_use]
    pub fn size(&self) -> Point {
        self.layout.size()
    }

    /// Offset of transformed value `v` along the bar.
    #[must_use]
    pub fn position_of(&self, v: f64) -> f64 {
        let length = if self.horizontal { self.bar_size.x } else { self.bar_size.y };
        let t = if self.domain.is_degenerate() {
            0.5
        } else {
            (v - self.domain.lower()) / self.domain.length()
        };
        if self.reverse { (1.0 - t) * length } else { t * length }
    }

    /// Scene of the colorbar with its top-left corner at `origin`.
    #[must_use]
    pub fn to_scene(&self, origin: Point) -> SceneNode {
        let mut children = legend_frame(&self.title, &self.layout, &self.theme);
        let graph = self.layout.graph_origin();
        let step = self.domain.length() / self.bins.len() as f64;

        let bins = self.bins.iter().enumerate().map(|(i, color)| {
            let lo = self.position_of(self.domain.lower() + step * i as f64);
            let hi = self.position_of(self.domain.lower() + step * (i + 1) as f64);
            let (a, b) = (lo.min(hi), lo.max(hi));
            let rect = if self.horizontal {
                Rect::new(a, 0.0, b - a, self.bar_size.y)
            } else {
                Rect::new(0.0, a, self.bar_size.x, b - a)
            };
            SceneNode::rect(rect, Style::filled(*color))
        });
        children.push(SceneNode::named_group("colorbar", graph, bins.collect()));

        let tick = self.bar_size.x.min(self.bar_size.y) / 5.0;
        let font = self.theme.text_font_size;
        for (_, v, label) in self.breaks.iter() {
            if !self.domain.contains(v) {
                continue;
            }
            let at = self.position_of(v);
            let (ticks, text) = if self.horizontal {
                let (x, bottom) = (graph.x + at, graph.y + self.bar_size.y);
                let ticks = [
                    (Point::new(x, graph.y), Point::new(x, graph.y + tick)),
                    (Point::new(x, bottom - tick), Point::new(x, bottom)),
                ];
                let text = TextNode::new(
                    Point::new(x, bottom + self.theme.label_padding + baseline(font)),
                    label,
                    font,
                    self.theme.text_color,
                )
                .anchor(TextAnchor::Middle);
                (ticks, text)
            } else {
                let (y, right) = (graph.y + at, graph.x + self.bar_size.x);
                let ticks = [
                    (Point::new(graph.x, y), Point::new(graph.x + tick, y)),
                    (Point::new(right - tick, y), Point::new(right, y)),
                ];
                let text = TextNode::new(
                    Point::new(right + self.theme.label_padding, y - self.label_height / 2.0 + baseline(font)),
                    label,
                    font,
                    self.theme.text_color,
                );
                (ticks, text)
            };
            for (a, b) in ticks {
                children.push(SceneNode::line(a, b, Style::stroked(Rgba::WHITE, 1.0)));
            }
            children.push(SceneNode::text(text));
        }
        SceneNode::named_group("legend", origin, children)
    }
}
